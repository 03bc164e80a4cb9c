/* Copyright (C) 2022 Antmicro
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     https://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use std::collections::{HashMap, HashSet};

/// A string key that compares and hashes by its lower-cased form while keeping
/// the original spelling for display.
#[derive(Clone)]
pub struct CaselessString {
    original: String,
    folded: String,
}

pub type CaselessMap<V> = HashMap<CaselessString, V>;
pub type CaselessSet = HashSet<CaselessString>;

impl CaselessString {
    pub fn new<S>(s: S) -> Self where S: Into<String> {
        let original = s.into();
        let folded = original.to_lowercase();
        Self { original, folded }
    }

    /// The spelling this key was created with.
    pub fn as_str(&self) -> &str {
        &self.original
    }

    pub fn folded(&self) -> &str {
        &self.folded
    }

    pub fn into_string(self) -> String {
        self.original
    }

    /// Case-insensitive comparison against a plain string.
    pub fn matches(&self, other: &str) -> bool {
        self.folded == other.to_lowercase()
    }
}

impl<'a> From<&'a str> for CaselessString {
    fn from(s: &'a str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CaselessString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl std::ops::Deref for CaselessString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.original
    }
}

impl std::fmt::Debug for CaselessString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CaselessString({})", self.original)
    }
}

impl std::fmt::Display for CaselessString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.original.fmt(f)
    }
}

impl std::hash::Hash for CaselessString {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.folded.hash(state)
    }
}

impl std::cmp::PartialEq for CaselessString {
    fn eq(&self, other: &Self) -> bool {
        self.folded.eq(&other.folded)
    }
}

impl std::cmp::Eq for CaselessString {}

impl std::cmp::PartialOrd for CaselessString {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::cmp::Ord for CaselessString {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.folded.cmp(&other.folded)
    }
}

/// Case-insensitive lookup helper so callers don't have to build a key by hand.
pub fn caseless_get<'m, V>(map: &'m CaselessMap<V>, key: &str) -> Option<&'m V> {
    map.get(&CaselessString::new(key))
}
