use std::path::{Path, PathBuf};

pub const HISTORY_FILE_NAME: &str = "history";

/// Expands a leading `~` or `~/` against `home`.
///
/// Paths without a tilde prefix, or any path when `home` is unknown, are returned unchanged.
#[must_use]
pub fn expand_home(path: &str, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return PathBuf::from(path);
    };

    if path == "~" {
        return home.to_path_buf();
    }

    match path.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::expand_home;
    use std::path::{Path, PathBuf};

    #[test]
    fn tilde_prefix_expands_against_home() {
        let home = Path::new("/home/menu");
        assert_eq!(
            expand_home("~/.cache/menu_history", Some(home)),
            PathBuf::from("/home/menu/.cache/menu_history")
        );
        assert_eq!(expand_home("~", Some(home)), PathBuf::from("/home/menu"));
    }

    #[test]
    fn other_paths_are_untouched() {
        let home = Path::new("/home/menu");
        assert_eq!(expand_home("/tmp/h", Some(home)), PathBuf::from("/tmp/h"));
        assert_eq!(expand_home("~user/h", Some(home)), PathBuf::from("~user/h"));
        assert_eq!(expand_home("~/h", None), PathBuf::from("~/h"));
    }
}
