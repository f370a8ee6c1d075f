/*!
 * Tests for script parsing
 */

use storyvox::script_parser::{ScriptParser, split_long_utterances};

#[test]
fn test_parse_withQuestionAnswerScript_shouldKeepOrderAndSpeakers() {
    let parser = ScriptParser::tagged(&["Q", "A"]);
    let utterances = parser.parse("Q: Hi\nA: Hello\nQ: Bye");

    let pairs: Vec<(&str, &str)> = utterances
        .iter()
        .map(|u| (u.speaker.as_str(), u.raw_text.as_str()))
        .collect();
    assert_eq!(pairs, vec![("Q", "Hi"), ("A", "Hello"), ("Q", "Bye")]);
}

#[test]
fn test_parse_withLowercaseTags_shouldUseCanonicalSpelling() {
    let parser = ScriptParser::tagged(&["CHAR1", "NARRATOR"]);
    let utterances = parser.parse("narrator: Night fell.\nchar1:   Who is there?");

    assert_eq!(utterances[0].speaker, "NARRATOR");
    assert_eq!(utterances[1].speaker, "CHAR1");
    assert_eq!(utterances[1].raw_text, "Who is there?");
}

#[test]
fn test_parse_withCrlfLineEndings_shouldParseCleanly() {
    let parser = ScriptParser::tagged(&["Q", "A"]);
    let utterances = parser.parse("Q: One?\r\nA: Two.\r\n");

    assert_eq!(utterances.len(), 2);
    assert_eq!(utterances[1].raw_text, "Two.");
}

#[test]
fn test_parse_withOnlyPreamble_shouldReturnEmpty() {
    let parser = ScriptParser::tagged(&["Q", "A"]);
    assert!(parser.parse("Just a title\nand notes").is_empty());
}

#[test]
fn test_untaggedParser_shouldAssignImplicitSpeaker() {
    let parser = ScriptParser::untagged("NARRATOR");
    let utterances = parser.parse("Line one.\nLine two.");

    assert!(utterances.iter().all(|u| u.speaker == "NARRATOR"));
    assert_eq!(utterances.iter().map(|u| u.ordinal).collect::<Vec<_>>(), vec![1, 2]);
    assert!(parser.prefixes().is_empty());
}

#[test]
fn test_splitLongUtterances_withShortText_shouldLeaveUnchanged() {
    let parser = ScriptParser::untagged("NARRATOR");
    let utterances = parser.parse("Short one.\nShort two.");

    let split = split_long_utterances(utterances.clone(), 500);
    assert_eq!(split, utterances);
}

#[test]
fn test_splitLongUtterances_withLongText_shouldRespectLimit() {
    let sentence = "This sentence is exactly long enough to matter. ";
    let long_text = sentence.repeat(20);
    let parser = ScriptParser::untagged("NARRATOR");
    let utterances = parser.parse(&format!("Intro.\n{}\nOutro.", long_text));

    let split = split_long_utterances(utterances, 200);

    assert!(split.len() > 3);
    assert!(split.iter().all(|u| u.raw_text.chars().count() <= 200));
    assert_eq!(split.first().map(|u| u.raw_text.as_str()), Some("Intro."));
    assert_eq!(split.last().map(|u| u.raw_text.as_str()), Some("Outro."));
    assert!(split.iter().enumerate().all(|(i, u)| u.ordinal == i + 1));
}
