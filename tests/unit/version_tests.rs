//! Release version validation.

use denovibe::skills::{release_tag, SEMVER_PATTERN};

#[test]
fn pattern_is_anchored() {
    assert!(SEMVER_PATTERN.starts_with('^'));
    assert!(SEMVER_PATTERN.ends_with('$'));
}

#[test]
fn accepts_plain_and_prefixed() {
    for (input, tag) in [
        ("0.0.1", "v0.0.1"),
        ("1.2.3", "v1.2.3"),
        ("v1.2.3", "v1.2.3"),
        ("10.20.30", "v10.20.30"),
    ] {
        assert_eq!(release_tag(input).as_deref(), Some(tag), "{input}");
    }
}

#[test]
fn accepts_prerelease_and_build_metadata() {
    assert_eq!(release_tag("1.0.0-beta.1").as_deref(), Some("v1.0.0-beta.1"));
    assert_eq!(release_tag("v1.0.0+sha.abc").as_deref(), Some("v1.0.0+sha.abc"));
}

#[test]
fn rejects_non_versions() {
    for input in [
        "",
        "latest",
        "1",
        "1.2",
        "1.2.x",
        "V1.2.3",
        " 1.2.3",
        "1.2.3 ",
        "not.valid.semver.string.x",
        "\u{0661}.\u{0662}.\u{0663}",
        "v\u{0967}.0.0",
    ] {
        assert!(release_tag(input).is_none(), "{input:?} should be rejected");
    }
}
