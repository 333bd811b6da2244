use std::path::PathBuf;

use projectpro::error::{exit_codes, Error};

#[test]
fn exit_codes_map_correctly() {
    let user = Error::InvalidArgument("bad".to_string());
    assert_eq!(user.exit_code(), exit_codes::USER_ERROR);

    let missing = Error::NotInitialized(PathBuf::from("/tmp/nowhere"));
    assert_eq!(missing.exit_code(), exit_codes::USER_ERROR);

    let io = Error::Io(std::io::Error::other("boom"));
    assert_eq!(io.exit_code(), exit_codes::OPERATION_FAILED);

    let lock = Error::LockFailed(PathBuf::from("store.lock"));
    assert_eq!(lock.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn validation_errors_name_the_field() {
    let err = Error::Validation {
        field: "title",
        message: "must not be empty".to_string(),
    };
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    assert_eq!(err.details().expect("details")["field"], "title");
    assert!(err.to_string().contains("title"));
}

#[test]
fn ambiguous_id_lists_matches_in_details() {
    let err = Error::AmbiguousId {
        input: "01".to_string(),
        matches: vec!["tsk_01a".to_string(), "tsk_01b".to_string()],
    };
    assert_eq!(err.to_string(), "Ambiguous id '01' matches tsk_01a, tsk_01b");
    let details = err.details().expect("details");
    assert_eq!(details["matches"][1], "tsk_01b");
}
