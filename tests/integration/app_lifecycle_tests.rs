/*!
 * Controller lifecycle tests: configuration, overwrite rules, folder mode
 * and error reporting
 */

use std::fs;

use anyhow::Result;
use videodoc::app_config::Config;
use videodoc::errors::NarrationError;
use videodoc::Controller;
use crate::common;

/// Test that an invalid configuration is rejected up front
#[test]
fn test_controller_withInvalidConfig_shouldFail() {
    let config = Config {
        fps: 0,
        ..Config::default()
    };

    let result = Controller::with_config(config);

    assert!(result.is_err());
}

/// Test a missing composition file
#[test]
fn test_extract_withMissingFile_shouldReportNotFound() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(Config::default())?;

    let error = controller
        .extract(&temp_dir.path().join("Missing.jsx"), false, false)
        .unwrap_err();

    assert!(matches!(
        error.downcast_ref::<NarrationError>(),
        Some(NarrationError::CompositionNotFound(_))
    ));
    assert!(error.to_string().starts_with("Composition file not found:"));
    Ok(())
}

/// Test a template without caption annotations
#[test]
fn test_extract_withoutCaptions_shouldReportNoCaptions() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let composition = common::create_test_file(
        temp_dir.path(),
        "Plain.jsx",
        "<Sequence from={0} durationInFrames={30}><Title /></Sequence>",
    )?;
    let controller = Controller::with_config(Config::default())?;

    let error = controller.extract(&composition, false, false).unwrap_err();

    assert!(matches!(
        error.downcast_ref::<NarrationError>(),
        Some(NarrationError::NoCaptions { .. })
    ));
    assert!(!temp_dir.path().join("Plain.narration.json").exists());
    Ok(())
}

/// Test the overwrite rules for existing narration files
#[test]
fn test_extract_withExistingNarration_shouldOnlyOverwriteWhenForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let composition = common::create_test_composition(temp_dir.path(), "Onboarding.jsx")?;
    let existing =
        common::create_test_file(temp_dir.path(), "Onboarding.narration.json", "keep me")?;
    let controller = Controller::with_config(Config::default())?;

    let report = controller.extract(&composition, false, false)?;
    assert!(!report.written);
    assert_eq!(fs::read_to_string(&existing)?, "keep me");

    let report = controller.extract(&composition, true, false)?;
    assert!(report.written);
    assert!(fs::read_to_string(&existing)?.contains("\"steps\""));
    Ok(())
}

/// Test folder mode counts
#[test]
fn test_extract_folder_withMixedFiles_shouldCountOutcomes() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_composition(root, "A.jsx")?;
    common::create_test_composition(root, "nested/B.tsx")?;
    common::create_test_file(root, "Empty.js", "export const x = 1;")?;
    common::create_test_file(root, "notes.md", "# not a composition")?;
    let controller = Controller::with_config(Config::default())?;

    let summary = controller.extract_folder(root, false, false)?;

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);
    assert!(root.join("A.narration.json").exists());
    assert!(root.join("nested/B.narration.json").exists());

    let again = controller.extract_folder(root, false, false)?;
    assert_eq!(again.processed, 0);
    assert_eq!(again.skipped, 3);
    Ok(())
}

/// Test folder mode on a directory without compositions
#[test]
fn test_extract_folder_withNoCompositions_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "readme.txt", "nothing")?;
    let controller = Controller::with_config(Config::default())?;

    assert!(controller.extract_folder(temp_dir.path(), false, false).is_err());
    assert!(controller.extract_folder(&temp_dir.path().join("missing"), false, false).is_err());
    Ok(())
}

/// Test planning error cases
#[test]
fn test_plan_withMissingOrInvalidNarration_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(Config::default())?;

    let missing = controller.plan(&temp_dir.path().join("None.narration.json")).unwrap_err();
    assert!(matches!(
        missing.downcast_ref::<NarrationError>(),
        Some(NarrationError::NarrationNotFound(_))
    ));

    let broken = common::create_test_file(
        temp_dir.path(),
        "Broken.narration.json",
        r#"{"fps": 0, "steps": []}"#,
    )?;
    let invalid = controller.plan(&broken).unwrap_err();
    assert!(matches!(
        invalid.downcast_ref::<NarrationError>(),
        Some(NarrationError::InvalidNarration { .. })
    ));

    let empty = common::create_test_file(
        temp_dir.path(),
        "Empty.narration.json",
        r#"{"fps": 30, "steps": []}"#,
    )?;
    let no_steps = controller.plan(&empty).unwrap_err();
    assert!(matches!(
        no_steps.downcast_ref::<NarrationError>(),
        Some(NarrationError::NoCaptions { .. })
    ));
    Ok(())
}

/// Test preview truncation
#[test]
fn test_truncate_withLongText_shouldAppendEllipsis() {
    assert_eq!(Controller::truncate("short", 10), "short");
    assert_eq!(Controller::truncate("abcdefghij", 4), "abcd…");
    assert_eq!(Controller::truncate("ação rápida", 4), "ação…");
}
