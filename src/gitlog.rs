use std::path::Path;
use std::process::{Command, Stdio};

/// hash, author, relative date, subject; tab separated
pub(crate) const PRETTY_FORMAT: &str = "--pretty=format:%h%x09%an%x09%ar%x09%s";

pub(crate) fn log_args(max_commits: usize) -> Vec<String> {
    vec![
        "log".to_string(),
        "-n".to_string(),
        max_commits.to_string(),
        PRETTY_FORMAT.to_string(),
    ]
}

/// Raw `git log` text for the ticker, or `None` when git is missing, the
/// directory is not a repository, or the command fails for any other reason.
pub(crate) fn recent_commits(max_commits: usize, dir: Option<&Path>) -> Option<String> {
    let mut cmd = Command::new("git");
    cmd.args(log_args(max_commits))
        .stdin(Stdio::null())
        .stderr(Stdio::null());
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }

    let out = match cmd.output() {
        Ok(out) => out,
        Err(e) => {
            log::info!("git unavailable: {e}");
            return None;
        }
    };
    if !out.status.success() {
        log::info!("git log exited with {}", out.status);
        return None;
    }
    Some(String::from_utf8_lossy(&out.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_limit_count_and_use_tab_format() {
        let args = log_args(20);
        assert_eq!(args[..3], ["log", "-n", "20"]);
        assert!(args[3].contains("%h%x09%an%x09%ar%x09%s"));
    }

    #[test]
    fn missing_directory_is_unavailable() {
        let dir = std::env::temp_dir().join("yulelog-no-such-dir-4f1c");
        assert!(recent_commits(5, Some(&dir)).is_none());
    }
}
