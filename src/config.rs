use crate::palette::Palette;
use std::path::PathBuf;
use std::time::Duration;

/// Points the ticker at a repository other than the working directory.
pub(crate) const GIT_DIR_ENV: &str = "YULE_LOG_GIT_DIR";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Mode {
    Fire,
    Contributions,
}

impl Mode {
    pub(crate) fn palette(self) -> Palette {
        match self {
            Mode::Fire => Palette::fire(),
            Mode::Contributions => Palette::contributions(),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Settings {
    pub(crate) mode: Mode,
    pub(crate) frame_delay: Duration,
    /// frames per ticker column
    pub(crate) ticker_cadence: u64,
    pub(crate) max_commits: usize,
    pub(crate) git_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: Mode::Fire,
            frame_delay: Duration::from_millis(30),
            ticker_cadence: 4,
            max_commits: 20,
            git_dir: None,
        }
    }
}

impl Settings {
    pub(crate) fn new(contribs: bool, git_dir: Option<PathBuf>) -> Self {
        Self {
            mode: if contribs {
                Mode::Contributions
            } else {
                Mode::Fire
            },
            git_dir,
            ..Self::default()
        }
    }

    pub(crate) fn from_env(contribs: bool) -> Self {
        let git_dir = std::env::var_os(GIT_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self::new(contribs, git_dir)
    }
}
