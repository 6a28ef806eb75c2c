//! Command Tests
//!
//! Tests verify:
//! - Argument validation at construction
//! - Request rendering and decoding
//! - Status line parsing
//! - Reply interpretation per verb

use beanline::protocol::{
    Command, Job, Reply, ResponseHead, Status, Verb, YamlValue, MAX_PAYLOAD_SIZE, MAX_PRIORITY,
};
use beanline::{Error, ErrorKind};
use bytes::Bytes;

fn head(line: &str) -> ResponseHead {
    ResponseHead::parse(line).unwrap()
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_put_rejects_priority_above_max() {
    let over = (MAX_PRIORITY + 1).to_string();
    let err = Command::new(Verb::Put, [over.as_str(), "0", "60"], Some(Bytes::from("x")))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(err.to_string().contains("priority must be between 0 and 4294967295"));
}

#[test]
fn test_put_rejects_negative_priority() {
    let err = Command::new(Verb::Put, ["-1", "0", "60"], Some(Bytes::from("x"))).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_put_rejects_negative_delay() {
    let err = Command::new(Verb::Put, ["0", "-1", "60"], Some(Bytes::from("x"))).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(ref m) if m.contains("delay")));
}

#[test]
fn test_put_rejects_zero_ttr() {
    assert!(matches!(
        Command::put("x", 0, 0, 0),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn test_put_rejects_oversized_payload() {
    let body = vec![b'a'; MAX_PAYLOAD_SIZE + 1];
    let err = Command::put(body, 0, 0, 60).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_put_accepts_payload_at_limit() {
    let body = vec![b'a'; MAX_PAYLOAD_SIZE];
    assert!(Command::put(body, 0, 0, 60).is_ok());
}

#[test]
fn test_put_requires_body() {
    let err = Command::new(Verb::Put, ["0", "0", "60"], None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_release_rejects_zero_job_id() {
    let err = Command::release(0, 10, 0).unwrap_err();
    assert!(err.to_string().contains("job id must be a positive integer"));
}

#[test]
fn test_release_rejects_non_numeric_job_id() {
    let err = Command::new(Verb::Release, ["abc", "0", "0"], None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_use_rejects_blank_tube() {
    for tube in ["", "   ", "\t\r\n"] {
        let err = Command::use_tube(tube).unwrap_err();
        assert!(
            err.to_string().contains("non-empty string after trimming"),
            "tube {:?} gave {}",
            tube,
            err
        );
    }
}

#[test]
fn test_use_trims_tube_name() {
    let command = Command::use_tube("  emails ").unwrap();
    assert_eq!(command.args(), ["emails"]);
    assert_eq!(&command.render()[..], b"use emails\r\n");
}

#[test]
fn test_tube_name_rules() {
    assert!(Command::use_tube("a-b+c/d;e.f$g_h(i)").is_ok());
    assert!(Command::use_tube("-leading").is_err());
    assert!(Command::use_tube("two words").is_err());
    assert!(Command::use_tube(&"t".repeat(201)).is_err());
    assert!(Command::use_tube(&"t".repeat(200)).is_ok());
}

#[test]
fn test_wrong_argument_count() {
    let err = Command::new(Verb::Delete, ["1", "2"], None).unwrap_err();
    assert!(err.to_string().contains("delete takes 1 argument(s), got 2"));
}

#[test]
fn test_kick_rejects_zero_bound() {
    assert!(Command::kick(0).is_err());
    assert!(Command::kick(1).is_ok());
}

// =============================================================================
// Rendering Tests
// =============================================================================

#[test]
fn test_render_put() {
    let command = Command::put("hello", 5, 10, 60).unwrap();
    assert_eq!(&command.render()[..], b"put 5 10 60 5\r\nhello\r\n");
}

#[test]
fn test_render_release() {
    let command = Command::release(42, 100, 3).unwrap();
    assert_eq!(&command.render()[..], b"release 42 100 3\r\n");
}

#[test]
fn test_render_bare_verbs() {
    assert_eq!(&Command::stats().render()[..], b"stats\r\n");
    assert_eq!(&Command::reserve().render()[..], b"reserve\r\n");
    assert_eq!(&Command::peek_buried().render()[..], b"peek-buried\r\n");
    assert_eq!(&Command::list_tubes_watched().render()[..], b"list-tubes-watched\r\n");
}

#[test]
fn test_render_decode_render_is_identity() {
    let commands = vec![
        Command::put("payload with\r\ninside", 1, 2, 3).unwrap(),
        Command::put("", 0, 0, 1).unwrap(),
        Command::use_tube("default").unwrap(),
        Command::reserve_with_timeout(5).unwrap(),
        Command::release(7, 1024, 0).unwrap(),
        Command::bury(7, 1).unwrap(),
        Command::pause_tube("jobs", 30).unwrap(),
        Command::stats_tube("jobs").unwrap(),
        Command::kick(100).unwrap(),
        Command::stats(),
    ];

    for command in commands {
        let rendered = command.render();
        let decoded = Command::decode(&rendered).unwrap();
        assert_eq!(decoded, command);
        assert_eq!(decoded.render(), rendered);
    }
}

#[test]
fn test_decode_rejects_body_length_mismatch() {
    let err = Command::decode(b"put 0 0 60 10\r\nshort\r\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_decode_rejects_huge_declared_length() {
    let err = Command::decode(b"put 1 0 1 18446744073709551615\r\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = Command::decode(b"put 1 0 1 18446744073709551614\r\nx\r\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_decode_rejects_malformed_length() {
    let err = Command::decode(b"put 1 0 1 ten\r\nx\r\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = Command::decode(b"put 1 0 1\r\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_decode_rejects_unknown_verb() {
    assert!(Command::decode(b"frobnicate 1\r\n").is_err());
}

#[test]
fn test_decode_revalidates_arguments() {
    assert!(Command::decode(b"delete 0\r\n").is_err());
}

// =============================================================================
// Status Line Tests
// =============================================================================

#[test]
fn test_response_head_splits_params() {
    let head = head("RESERVED 12 5");
    assert_eq!(head.status, Status::Reserved);
    assert_eq!(head.params, vec!["12", "5"]);
    assert_eq!(head.number_param(0).unwrap(), 12);
}

#[test]
fn test_response_head_rejects_unknown_word() {
    let err = ResponseHead::parse("WHAT 1").unwrap_err();
    assert!(matches!(err, Error::UnexpectedStatus(ref word) if word == "WHAT"));
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

#[test]
fn test_response_head_rejects_empty_line() {
    assert_eq!(
        ResponseHead::parse("").unwrap_err().kind(),
        ErrorKind::Protocol
    );
}

#[test]
fn test_every_status_word_round_trips() {
    for status in Status::ALL {
        assert_eq!(status.as_str().parse::<Status>().unwrap(), status);
    }
}

// =============================================================================
// Put Reply Tests
// =============================================================================

#[test]
fn test_put_parses_inserted_and_buried() {
    let command = Command::put("test", 0, 0, 60).unwrap();

    assert_eq!(
        command.parse(&head("INSERTED 1"), None).unwrap(),
        Reply::Number { status: Status::Inserted, value: 1 }
    );
    assert_eq!(
        command.parse(&head("BURIED 2"), None).unwrap(),
        Reply::Number { status: Status::Buried, value: 2 }
    );
}

#[test]
fn test_put_client_errors() {
    let command = Command::put("test", 0, 0, 60).unwrap();

    for line in ["EXPECTED_CRLF", "JOB_TOO_BIG", "BAD_FORMAT", "UNKNOWN_COMMAND"] {
        let err = command.parse(&head(line), None).unwrap_err();
        assert!(matches!(err, Error::Rejected(_)), "{} gave {:?}", line, err);
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }
}

#[test]
fn test_put_server_errors() {
    let command = Command::put("test", 0, 0, 60).unwrap();

    for line in ["DRAINING", "OUT_OF_MEMORY", "INTERNAL_ERROR"] {
        let err = command.parse(&head(line), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server, "{}", line);
    }
}

#[test]
fn test_put_missing_job_id() {
    let command = Command::put("", 0, 0, 60).unwrap();
    let err = command.parse(&head("INSERTED"), None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

#[test]
fn test_put_unexpected_status() {
    let command = Command::put("x", 0, 0, 60).unwrap();
    let err = command.parse(&head("DELETED"), None).unwrap_err();
    assert!(matches!(err, Error::UnexpectedStatus(ref word) if word == "DELETED"));
}

// =============================================================================
// Release / Use Reply Tests
// =============================================================================

#[test]
fn test_release_replies() {
    let command = Command::release(3, 0, 0).unwrap();

    assert_eq!(
        command.parse(&head("RELEASED"), None).unwrap(),
        Reply::Word(Status::Released)
    );
    assert_eq!(
        command.parse(&head("BURIED"), None).unwrap(),
        Reply::Word(Status::Buried)
    );
    assert!(command.parse(&head("NOT_FOUND"), None).unwrap().is_empty());
}

#[test]
fn test_release_rejects_unexpected_body() {
    let command = Command::release(3, 0, 0).unwrap();
    let err = command.parse(&head("RELEASED"), Some(&b"junk"[..])).unwrap_err();
    assert!(err.to_string().contains("Unexpected response data"));
}

#[test]
fn test_use_returns_confirmed_tube() {
    let command = Command::use_tube("emails").unwrap();
    assert_eq!(
        command.parse(&head("USING emails"), None).unwrap(),
        Reply::Name("emails".to_string())
    );
}

#[test]
fn test_use_rejects_other_status() {
    let command = Command::use_tube("emails").unwrap();
    assert!(command.parse(&head("WATCHING 1"), None).is_err());
}

// =============================================================================
// Body Reply Tests
// =============================================================================

#[test]
fn test_reserve_reads_job() {
    let command = Command::reserve();
    let head = head("RESERVED 9 5");

    assert_eq!(command.expected_body_len(&head).unwrap(), Some(5));
    assert_eq!(
        command.parse(&head, Some(&b"hello"[..])).unwrap(),
        Reply::Job(Job { id: 9, body: Bytes::from("hello") })
    );
}

#[test]
fn test_reserve_timeout_is_empty() {
    let command = Command::reserve_with_timeout(1).unwrap();
    for line in ["TIMED_OUT", "DEADLINE_SOON"] {
        assert_eq!(command.expected_body_len(&head(line)).unwrap(), None);
        assert!(command.parse(&head(line), None).unwrap().is_empty());
    }
}

#[test]
fn test_job_body_must_match_declared_length() {
    let command = Command::peek(1).unwrap();
    let err = command.parse(&head("FOUND 1 10"), Some(&b"short"[..])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

#[test]
fn test_job_reply_requires_body() {
    let command = Command::peek(1).unwrap();
    assert!(command.parse(&head("FOUND 1 0"), None).is_err());
    assert!(command.parse(&head("FOUND 1 0"), Some(&b""[..])).is_ok());
}

#[test]
fn test_stats_parses_mapping() {
    let command = Command::stats();
    let body = b"---\ncurrent-jobs-ready: 3\nversion: \"1.13\"\n";
    let head = head(&format!("OK {}", body.len()));

    let reply = command.parse(&head, Some(&body[..])).unwrap();
    let Reply::Yaml(doc) = reply else {
        panic!("Expected YAML reply");
    };
    assert_eq!(doc.get_u64("current-jobs-ready"), Some(3));
    assert_eq!(doc.get("version"), Some("1.13"));
}

#[test]
fn test_stats_rejects_empty_body() {
    let command = Command::stats();
    let err = command.parse(&head("OK 0"), Some(&b""[..])).unwrap_err();
    assert!(err.to_string().contains("empty response"));
}

#[test]
fn test_list_tubes_parses_sequence() {
    let command = Command::list_tubes();
    let body = b"---\n- default\n- emails\n";
    let head = head(&format!("OK {}", body.len()));

    assert_eq!(
        command.parse(&head, Some(&body[..])).unwrap(),
        Reply::Yaml(YamlValue::Sequence(vec!["default".into(), "emails".into()]))
    );
}

#[test]
fn test_stats_job_not_found_is_empty() {
    let command = Command::stats_job(5).unwrap();
    assert!(command.parse(&head("NOT_FOUND"), None).unwrap().is_empty());
}

#[test]
fn test_ignore_last_tube_is_rejected() {
    let command = Command::ignore("default").unwrap();
    let err = command.parse(&head("NOT_IGNORED"), None).unwrap_err();
    assert!(matches!(err, Error::Rejected(Status::NotIgnored)));
}

#[test]
fn test_oversized_declared_body_is_refused() {
    let command = Command::stats();
    assert!(command.expected_body_len(&head("OK 999999999")).is_err());
}
