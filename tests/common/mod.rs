#![allow(dead_code)]

use std::cell::Cell;
use std::fs;
use std::path::PathBuf;

use fpl_helper::error::FetchError;
use fpl_helper::fpl_fetch::{
    Bootstrap, LeagueSource, TemplateTeam, UserEntry, parse_bootstrap_json, parse_entry_json,
};

pub fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

pub fn fixture_bootstrap() -> Bootstrap {
    parse_bootstrap_json(&read_fixture("bootstrap_static.json")).expect("bootstrap fixture parses")
}

pub fn fixture_entry() -> UserEntry {
    parse_entry_json(&read_fixture("entry.json")).expect("entry fixture parses")
}

pub fn parse_failure() -> FetchError {
    FetchError::Parse {
        what: "bootstrap",
        source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
    }
}

/// In-memory league that counts every fetch.
pub struct FakeSource {
    pub bootstrap: Bootstrap,
    pub entry: UserEntry,
    pub fail_bootstrap: bool,
    pub fail_entry: bool,
    pub bootstrap_calls: Cell<u32>,
    pub entry_calls: Cell<u32>,
}

impl FakeSource {
    pub fn new(bootstrap: Bootstrap, entry: UserEntry) -> Self {
        Self {
            bootstrap,
            entry,
            fail_bootstrap: false,
            fail_entry: false,
            bootstrap_calls: Cell::new(0),
            entry_calls: Cell::new(0),
        }
    }

    pub fn from_fixtures() -> Self {
        Self::new(fixture_bootstrap(), fixture_entry())
    }

    pub fn total_calls(&self) -> u32 {
        self.bootstrap_calls.get() + self.entry_calls.get()
    }
}

impl LeagueSource for FakeSource {
    fn bootstrap(&self) -> Result<Bootstrap, FetchError> {
        self.bootstrap_calls.set(self.bootstrap_calls.get() + 1);
        if self.fail_bootstrap {
            return Err(parse_failure());
        }
        Ok(self.bootstrap.clone())
    }

    fn entry(&self, _entry_id: u64) -> Result<UserEntry, FetchError> {
        self.entry_calls.set(self.entry_calls.get() + 1);
        if self.fail_entry {
            return Err(parse_failure());
        }
        Ok(self.entry.clone())
    }

    fn top10k_template(&self) -> Result<TemplateTeam, FetchError> {
        Ok(TemplateTeam::default())
    }
}
