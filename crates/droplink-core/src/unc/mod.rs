//! UNC path recognition and translation.
//!
//! Build artifacts published to a Windows file share carry their location as
//! a UNC path (`\\host\share\sub\path`). This module classifies raw source
//! strings into UNC references that need share resolution and local paths
//! that are used as-is.

use camino::{Utf8Path, Utf8PathBuf};
use once_cell::sync::Lazy;
use regex::Regex;

/// Shape of a UNC path: two leading backslashes, then host, share and
/// remainder. The lazy quantifiers stop host and share at their first
/// backslash each.
static UNC_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\\\\(.+?)\\(.+?)\\(.*)$").expect("UNC pattern is valid"));

/// A parsed `\\host\share\sub_path` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UncPath {
    /// Host segment, verbatim from the input.
    pub host: String,
    /// Share segment, verbatim from the input.
    pub share: String,
    /// Everything after the share, still backslash-separated. May be empty.
    pub sub_path: String,
}

/// Classification of an artifact source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourcePath {
    /// A UNC reference that needs share resolution before it can be used.
    Unc(UncPath),
    /// Anything else, already usable as a local path.
    Local(Utf8PathBuf),
}

impl SourcePath {
    /// Classify a raw source string.
    ///
    /// Strings that do not match the full UNC shape (including bare
    /// `\\host\share` without a trailing separator) come back as
    /// [`SourcePath::Local`] and pass through untranslated.
    pub fn parse(raw: &str) -> Self {
        match UNC_PATTERN.captures(raw) {
            Some(caps) => Self::Unc(UncPath {
                host: caps[1].to_string(),
                share: caps[2].to_string(),
                sub_path: caps[3].to_string(),
            }),
            None => Self::Local(Utf8PathBuf::from(raw)),
        }
    }
}

impl UncPath {
    /// Share name normalized for cache keying.
    pub fn share_key(&self) -> String {
        self.share.to_lowercase()
    }

    /// True when the declared host is the machine we are running on.
    /// `localhost` and the loopback address always count as local.
    pub fn is_local_to(&self, machine_name: &str) -> bool {
        let host = self.host.to_lowercase();
        host == "localhost" || host == "127.0.0.1" || host.eq_ignore_ascii_case(machine_name)
    }

    /// Join the share's local root with this sub-path, translating the
    /// backslash-separated segments into native path components. Empty
    /// segments (doubled or trailing backslashes) are dropped.
    pub fn join_sub_path(&self, root: &Utf8Path) -> Utf8PathBuf {
        let mut joined = root.to_path_buf();
        for segment in self.sub_path.split('\\').filter(|s| !s.is_empty()) {
            joined.push(segment);
        }
        joined
    }
}

/// Join an artifact's declared source data with a trailing name the way the
/// publishing side laid it out: backslash-joined when the data is UNC
/// shaped, native join otherwise.
pub fn join_source(data: &str, name: &str) -> String {
    if data.starts_with(r"\\") {
        format!(r"{}\{}", data.trim_end_matches('\\'), name)
    } else if data.is_empty() {
        name.to_string()
    } else {
        Utf8Path::new(data).join(name).into_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_full_unc_path() {
        let parsed = SourcePath::parse(r"\\build01\artifacts\20\drop");
        assert_eq!(
            parsed,
            SourcePath::Unc(UncPath {
                host: "build01".to_string(),
                share: "artifacts".to_string(),
                sub_path: r"20\drop".to_string(),
            })
        );
    }

    #[test]
    fn parses_unc_path_with_empty_sub_path() {
        let parsed = SourcePath::parse(r"\\build01\artifacts\");
        assert_eq!(
            parsed,
            SourcePath::Unc(UncPath {
                host: "build01".to_string(),
                share: "artifacts".to_string(),
                sub_path: String::new(),
            })
        );
    }

    #[test]
    fn host_and_share_stop_at_first_backslash() {
        let parsed = SourcePath::parse(r"\\a\b\c\d\e");
        match parsed {
            SourcePath::Unc(unc) => {
                assert_eq!(unc.host, "a");
                assert_eq!(unc.share, "b");
                assert_eq!(unc.sub_path, r"c\d\e");
            }
            other => panic!("expected UNC, got {other:?}"),
        }
    }

    #[test]
    fn bare_host_and_share_is_not_unc() {
        // No separator after the share segment, the pattern requires one.
        assert_eq!(
            SourcePath::parse(r"\\build01\artifacts"),
            SourcePath::Local(Utf8PathBuf::from(r"\\build01\artifacts"))
        );
    }

    #[test]
    fn local_paths_pass_through() {
        assert_eq!(
            SourcePath::parse("/mnt/artifacts/20/drop"),
            SourcePath::Local(Utf8PathBuf::from("/mnt/artifacts/20/drop"))
        );
        assert_eq!(
            SourcePath::parse(r"C:\artifacts\20"),
            SourcePath::Local(Utf8PathBuf::from(r"C:\artifacts\20"))
        );
        // A single leading backslash is not a UNC marker.
        assert_eq!(
            SourcePath::parse(r"\build01\artifacts\20"),
            SourcePath::Local(Utf8PathBuf::from(r"\build01\artifacts\20"))
        );
        assert_eq!(
            SourcePath::parse(""),
            SourcePath::Local(Utf8PathBuf::new())
        );
    }

    #[test]
    fn locality_accepts_loopback_and_machine_name() {
        let unc = UncPath {
            host: "BUILD01".to_string(),
            share: "artifacts".to_string(),
            sub_path: String::new(),
        };
        assert!(unc.is_local_to("build01"));
        assert!(!unc.is_local_to("build02"));

        let loopback = UncPath {
            host: "LocalHost".to_string(),
            share: "artifacts".to_string(),
            sub_path: String::new(),
        };
        assert!(loopback.is_local_to("anything"));

        let addr = UncPath {
            host: "127.0.0.1".to_string(),
            share: "artifacts".to_string(),
            sub_path: String::new(),
        };
        assert!(addr.is_local_to("anything"));
    }

    #[test]
    fn join_sub_path_translates_backslashes() {
        let unc = UncPath {
            host: "build01".to_string(),
            share: "artifacts".to_string(),
            sub_path: r"20\drop\bin".to_string(),
        };
        let joined = unc.join_sub_path(Utf8Path::new("/srv/share"));
        assert_eq!(joined, Utf8PathBuf::from("/srv/share/20/drop/bin"));
    }

    #[test]
    fn join_sub_path_drops_empty_segments() {
        let unc = UncPath {
            host: "build01".to_string(),
            share: "artifacts".to_string(),
            sub_path: r"20\\drop\".to_string(),
        };
        let joined = unc.join_sub_path(Utf8Path::new("/srv/share"));
        assert_eq!(joined, Utf8PathBuf::from("/srv/share/20/drop"));
    }

    #[test]
    fn join_source_trims_trailing_backslash_on_unc_data() {
        assert_eq!(
            join_source(r"\\build01\artifacts\20\", "drop"),
            r"\\build01\artifacts\20\drop"
        );
    }

    proptest! {
        #[test]
        fn unc_roundtrip_preserves_segments(
            host in "[a-zA-Z0-9._-]{1,12}",
            share in "[a-zA-Z0-9._-]{1,12}",
            sub in "[a-zA-Z0-9._-]{0,12}",
        ) {
            let raw = format!(r"\\{host}\{share}\{sub}");
            match SourcePath::parse(&raw) {
                SourcePath::Unc(unc) => {
                    prop_assert_eq!(unc.host, host);
                    prop_assert_eq!(unc.share, share);
                    prop_assert_eq!(unc.sub_path, sub);
                }
                SourcePath::Local(_) => prop_assert!(false, "expected UNC for {}", raw),
            }
        }

        #[test]
        fn non_unc_prefix_is_always_local(
            raw in r"[a-zA-Z0-9\\/._-]{0,40}".prop_filter(
                "a leading double backslash is the UNC marker",
                |s| !s.starts_with(r"\\"),
            ),
        ) {
            // No leading double backslash, must classify as local even
            // when backslashes appear elsewhere in the path.
            prop_assert!(matches!(
                SourcePath::parse(&raw),
                SourcePath::Local(_)
            ));
        }
    }
}
