//! Random first name, last name and username for sign-up forms.

use std::fs;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Error, Result};

const FIRST_NAMES_FILE: &str = "First_Name_DB.txt";
const LAST_NAMES_FILE: &str = "Last_Name_DB.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

/// The two word lists names are drawn from.
#[derive(Debug, Clone)]
pub struct NameLists {
    first: Vec<String>,
    last: Vec<String>,
}

impl NameLists {
    /// Read both lists from `dir`, one name per line.
    pub fn load(dir: &Path) -> Result<Self> {
        let read = |file: &str| -> Result<Vec<String>> {
            let path = dir.join(file);
            let text = fs::read_to_string(&path)
                .map_err(|e| Error::Identity(format!("reading {}: {e}", path.display())))?;
            Ok(parse_names(&text))
        };
        Self::new(read(FIRST_NAMES_FILE)?, read(LAST_NAMES_FILE)?)
    }

    pub fn new(first: Vec<String>, last: Vec<String>) -> Result<Self> {
        if first.is_empty() || last.is_empty() {
            return Err(Error::Identity("name lists must not be empty".into()));
        }
        Ok(Self { first, last })
    }

    /// Pick one of each uniformly and derive a username with a numeric tail.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Identity {
        let first_name = self.first.choose(rng).cloned().unwrap_or_default();
        let last_name = self.last.choose(rng).cloned().unwrap_or_default();
        let username = format!("{first_name}{last_name}{}", rng.gen_range(0..10000));
        Identity {
            first_name,
            last_name,
            username,
        }
    }
}

fn parse_names(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    #[test]
    fn test_parse_skips_blank_lines() {
        assert_eq!(parse_names("Ann\r\n\n  Bob \n"), vec!["Ann", "Bob"]);
    }

    #[test]
    fn test_generate_from_single_entries() {
        let lists = NameLists::new(vec!["Ann".into()], vec!["Lee".into()]).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let identity = lists.generate(&mut rng);
        assert_eq!(identity.first_name, "Ann");
        assert_eq!(identity.last_name, "Lee");
        let tail = identity.username.strip_prefix("AnnLee").unwrap();
        assert!(tail.parse::<u32>().unwrap() < 10000);
    }

    #[test]
    fn test_load_from_dir() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(FIRST_NAMES_FILE), "Ann\nBea\n").unwrap();
        fs::write(temp.path().join(LAST_NAMES_FILE), "Lee\n").unwrap();
        let lists = NameLists::load(temp.path()).unwrap();
        let identity = lists.generate(&mut StdRng::seed_from_u64(1));
        assert!(["Ann", "Bea"].contains(&identity.first_name.as_str()));
    }

    #[test]
    fn test_missing_or_empty_lists() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            NameLists::load(temp.path()),
            Err(Error::Identity(_))
        ));
        fs::write(temp.path().join(FIRST_NAMES_FILE), "\n").unwrap();
        fs::write(temp.path().join(LAST_NAMES_FILE), "Lee\n").unwrap();
        assert!(NameLists::load(temp.path()).is_err());
    }
}
