use std::fmt;
use std::path::{Path, PathBuf};

/// Closed set of engine variants the harness can drive. Adding one is a
/// deliberate code change: executable naming and mandatory flags live here
/// and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Backend {
    /// The engine's built-in brute-force fuzzer.
    Builtin,
    Afl,
    #[value(name = "libfuzzer")]
    LibFuzzer,
    Honggfuzz,
    Angora,
    Eclipser,
    Angr,
    Figurative,
}

impl Backend {
    pub const ALL: [Backend; 8] = [
        Backend::Builtin,
        Backend::Afl,
        Backend::LibFuzzer,
        Backend::Honggfuzz,
        Backend::Angora,
        Backend::Eclipser,
        Backend::Angr,
        Backend::Figurative,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Backend::Builtin => "builtin",
            Backend::Afl => "afl",
            Backend::LibFuzzer => "libfuzzer",
            Backend::Honggfuzz => "honggfuzz",
            Backend::Angora => "angora",
            Backend::Eclipser => "eclipser",
            Backend::Angr => "angr",
            Backend::Figurative => "figurative",
        }
    }

    /// Executable under the engine prefix. The built-in fuzzer lives in the
    /// bare engine binary; every frontend ships as `<prefix>-<id>`.
    pub fn executable(&self, prefix: &Path) -> PathBuf {
        match self {
            Backend::Builtin => prefix.to_path_buf(),
            other => {
                let mut name = prefix.as_os_str().to_os_string();
                name.push(format!("-{}", other.id()));
                PathBuf::from(name)
            }
        }
    }

    /// Flags the harness always passes for this backend, appended after the
    /// scenario's own arguments.
    pub fn mandatory_args(&self) -> &'static [&'static str] {
        match self {
            Backend::Builtin => &["--fuzz"],
            _ => &[],
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
