/*!
 * Tests for the narration extraction engine
 */

use std::num::NonZeroU32;

use videodoc::narration::{
    extract_constants, extract_narration, extract_narration_with, find_blocks, resolve_expression,
    ExtractOptions, DEFAULT_FPS,
};

fn fps(value: u32) -> NonZeroU32 {
    NonZeroU32::new(value).unwrap()
}

/// Test that a document without blocks yields no steps
#[test]
fn test_extract_withNoSequence_shouldReturnEmptySteps() {
    let result = extract_narration("<AbsoluteFill><div>Hello</div></AbsoluteFill>", fps(30));

    assert_eq!(result.fps.get(), 30);
    assert!(result.steps.is_empty());
}

/// Test the single caption scenario
#[test]
fn test_extract_withIntroAndCaption_shouldReturnOneStep() {
    let source = concat!(
        r#"<Sequence from={0} durationInFrames={90}><Intro title="Hi"/></Sequence>"#,
        r#"<Sequence from={90} durationInFrames={90}>"#,
        r#"<Caption text="This is the dashboard."/></Sequence>"#,
    );

    let result = extract_narration(source, fps(30));

    assert_eq!(result.steps.len(), 1);
    let step = &result.steps[0];
    assert_eq!(step.from, 90);
    assert_eq!(step.duration_in_frames, 90);
    assert_eq!(step.start_seconds, 3.0);
    assert_eq!(step.duration_seconds, 3.0);
    assert_eq!(step.text, "This is the dashboard.");
}

/// Test sibling blocks keep document order
#[test]
fn test_extract_withSiblingSequences_shouldKeepOrder() {
    let source = r#"
      <Sequence from={0} durationInFrames={90}>
        <Intro title="Hi" />
      </Sequence>
      <Sequence from={90} durationInFrames={75}>
        <Caption text="First step." theme={theme} />
      </Sequence>
      <Sequence from={165} durationInFrames={90}>
        <Caption text="Second step." theme={theme} />
      </Sequence>
    "#;

    let result = extract_narration(source, fps(30));

    assert_eq!(result.steps.len(), 2);
    assert_eq!(result.steps[0].text, "First step.");
    assert_eq!(result.steps[0].start_seconds, 3.0);
    assert_eq!(result.steps[0].duration_seconds, 2.5);
    assert_eq!(result.steps[1].text, "Second step.");
    assert_eq!(result.steps[1].from, 165);
    assert_eq!(result.steps[1].start_seconds, 5.5);
}

/// Test custom frame rates
#[test]
fn test_extract_withSixtyFps_shouldConvertToSeconds() {
    let source = r#"
      <Sequence from={60} durationInFrames={60}>
        <Caption text="One second at 60fps." theme={theme} />
      </Sequence>
    "#;

    let result = extract_narration(source, fps(60));

    assert_eq!(result.fps.get(), 60);
    assert_eq!(result.steps[0].start_seconds, 1.0);
    assert_eq!(result.steps[0].duration_seconds, 1.0);
}

/// Test that seconds are the frame values divided by fps, rounded to 2 decimals
#[test]
fn test_extract_withVariousFps_shouldRoundSecondsToTwoDecimals() {
    let source = r#"<Sequence from={100} durationInFrames={47}><Caption text="x"/></Sequence>"#;

    for rate in [1u32, 7, 24, 25, 29, 30, 60, 120] {
        let result = extract_narration(source, fps(rate));
        let step = &result.steps[0];
        let expected_start = (100.0 / rate as f64 * 100.0).round() / 100.0;
        let expected_duration = (47.0 / rate as f64 * 100.0).round() / 100.0;
        assert_eq!(step.start_seconds, expected_start, "fps {}", rate);
        assert_eq!(step.duration_seconds, expected_duration, "fps {}", rate);
    }
}

/// Test that quote style never changes the extracted text
#[test]
fn test_extract_withDifferentQuoteStyles_shouldExtractSameText() {
    let open = "<Sequence from={0} durationInFrames={30}>";
    let texts: Vec<String> = ["\"", "'", "`"]
        .iter()
        .map(|q| {
            let source = format!("{open}<Caption text={q}Single quotes{q} /></Sequence>");
            extract_narration(&source, DEFAULT_FPS).steps[0].text.clone()
        })
        .collect();

    assert_eq!(texts, vec!["Single quotes"; 3]);
}

/// Test that an escaped delimiter is unescaped
#[test]
fn test_extract_withEscapedQuote_shouldUnescape() {
    let source = r#"<Sequence from={0} durationInFrames={30}>
      <Caption text="say \"hi\"" />
    </Sequence>"#;

    let result = extract_narration(source, DEFAULT_FPS);

    assert_eq!(result.steps[0].text, r#"say "hi""#);
}

/// Test that a constant expression resolves like the equivalent literal
#[test]
fn test_extract_withConstantExpression_shouldMatchLiteral() {
    let symbolic = r#"
      const STEP = 90;
      <Sequence from={STEP*2} durationInFrames={STEP}><Caption text="Go" /></Sequence>
    "#;
    let literal = r#"<Sequence from={180} durationInFrames={90}><Caption text="Go" /></Sequence>"#;

    assert_eq!(
        extract_narration(symbolic, DEFAULT_FPS),
        extract_narration(literal, DEFAULT_FPS)
    );
}

/// Test that a block without duration is skipped without affecting later blocks
#[test]
fn test_extract_withMissingDuration_shouldSkipOnlyThatBlock() {
    let source = r#"
      <Sequence from={0}><Caption text="Lost" /></Sequence>
      <Sequence from={30} durationInFrames={30}><Caption text="Kept" /></Sequence>
    "#;

    let result = extract_narration(source, DEFAULT_FPS);

    assert_eq!(result.steps.len(), 1);
    assert_eq!(result.steps[0].text, "Kept");
}

/// Test that unresolvable timing skips the block
#[test]
fn test_extract_withUnresolvableTiming_shouldSkipBlock() {
    let source = r#"
      const stepDuration = 75;
      <Sequence from={0} durationInFrames={stepDuration}><Caption text="camel" /></Sequence>
      <Sequence from={UNKNOWN} durationInFrames={30}><Caption text="unknown" /></Sequence>
      <Sequence from={Math.max(1, 2)} durationInFrames={30}><Caption text="call" /></Sequence>
      <Sequence from={30} durationInFrames={30}><Caption text="fine" /></Sequence>
    "#;

    let result = extract_narration(source, DEFAULT_FPS);

    assert_eq!(result.steps.len(), 1);
    assert_eq!(result.steps[0].text, "fine");
}

/// Test that attributes may appear in any order
#[test]
fn test_extract_withReversedAttributes_shouldResolveTiming() {
    let source = r#"<Sequence name="Step" durationInFrames={45} from={15}>
      <Caption text="Any order" />
    </Sequence>"#;

    let result = extract_narration(source, DEFAULT_FPS);

    assert_eq!(result.steps[0].from, 15);
    assert_eq!(result.steps[0].duration_in_frames, 45);
}

/// Test that timing text inside a quoted attribute value is ignored
#[test]
fn test_extract_withTimingTextInQuotedAttribute_shouldUseRealAttribute() {
    let source = r#"<Sequence title="from={999}" from={0} durationInFrames={30}>
      <Caption text="A" />
    </Sequence>"#;

    let result = extract_narration(source, DEFAULT_FPS);

    assert_eq!(result.steps.len(), 1);
    assert_eq!(result.steps[0].from, 0);
    assert_eq!(result.steps[0].text, "A");
}

/// Test that nested blocks do not end the outer body early
#[test]
fn test_extract_withNestedSequence_shouldUseOuterTimingForWholeBody() {
    let source = r#"
      <Sequence from={0} durationInFrames={300}>
        <Caption text="Outer first" />
        <Sequence from={30} durationInFrames={60}>
          <Caption text="Inner" />
        </Sequence>
        <Caption text="Outer last" />
      </Sequence>
      <Sequence from={300} durationInFrames={30}><Caption text="After" /></Sequence>
    "#;

    let blocks = find_blocks(source);
    assert_eq!(blocks.len(), 2);
    assert!(blocks[0].body.contains("<Caption text=\"Inner\" />"));
    assert!(blocks[0].body.trim_end().ends_with("<Caption text=\"Outer last\" />"));

    let result = extract_narration(source, DEFAULT_FPS);
    let texts: Vec<&str> = result.steps.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["Outer first", "Inner", "Outer last", "After"]);
    assert!(result.steps[..3].iter().all(|s| s.from == 0));
    assert_eq!(result.steps[3].from, 300);
}

/// Test multiple captions within one block and empty captions
#[test]
fn test_extract_withMultipleCaptionsInBlock_shouldEmitEachNonEmpty() {
    let source = r#"<Sequence from={30} durationInFrames={60}>
        <Caption text="One" /><Caption text="  " /><Caption text="  Two  " />
      </Sequence>"#;

    let result = extract_narration(source, DEFAULT_FPS);

    let texts: Vec<&str> = result.steps.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["One", "Two"]);
    assert!(result.steps.iter().all(|s| s.from == 30 && s.duration_in_frames == 60));
}

/// Test the step count property over a mixed document
#[test]
fn test_extract_withMixedBlocks_shouldCountOnlyCaptionsInTimedBlocks() {
    let source = r#"
      const A = 10;
      <Caption text="outside any block" />
      <Sequence from={A} durationInFrames={A}><Caption text="1" /><Caption text="2" /></Sequence>
      <Sequence durationInFrames={A}><Caption text="no from" /></Sequence>
      <Sequence from={A * 3} durationInFrames={(A + 5) * 2}><Caption text="3" /></Sequence>
    "#;

    let result = extract_narration(source, DEFAULT_FPS);

    let texts: Vec<&str> = result.steps.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["1", "2", "3"]);
    assert_eq!(result.steps[2].from, 30);
    assert_eq!(result.steps[2].duration_in_frames, 30);
}

/// Test that a malformed trailing block keeps earlier results
#[test]
fn test_extract_withMalformedTrailingBlock_shouldKeepPartialResults() {
    let source = r#"<Sequence from={0} durationInFrames={30}><Caption text="ok" /></Sequence>
      <Sequence from={30} durationInFrames={30}><Caption text="never closed" />"#;

    let result = extract_narration(source, DEFAULT_FPS);

    assert_eq!(result.steps.len(), 1);
    assert_eq!(result.steps[0].text, "ok");
}

/// Test custom block tag and caption attribute options
#[test]
fn test_extractWith_withCustomOptions_shouldUseThem() {
    let options = ExtractOptions {
        fps: NonZeroU32::new(25).unwrap(),
        block_tag: "Scene".to_string(),
        caption_attribute: "say".to_string(),
    };
    let source = r#"
      <Sequence from={0} durationInFrames={25}><Caption text="ignored" /></Sequence>
      <Scene from={50} durationInFrames={25}><Voice say="Scene line" /></Scene>
    "#;

    let result = extract_narration_with(source, &options);

    assert_eq!(result.fps.get(), 25);
    assert_eq!(result.steps.len(), 1);
    assert_eq!(result.steps[0].text, "Scene line");
    assert_eq!(result.steps[0].start_seconds, 2.0);
}

/// Test the constant resolver contract directly
#[test]
fn test_resolveExpression_withDeclaredConstants_shouldEvaluate() {
    let constants = extract_constants("const INTRO = 90;\nconst STEP_DUR = 75;\nlet label = 3;");

    assert_eq!(constants.len(), 2);
    assert_eq!(resolve_expression("INTRO + STEP_DUR * 2", &constants), Some(240));
    assert_eq!(resolve_expression("(INTRO + STEP_DUR) * 2", &constants), Some(330));
    assert_eq!(resolve_expression("label", &constants), None);
}
