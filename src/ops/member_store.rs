use std::collections::HashMap;

use chrono::{DateTime, Local};
use indexmap::IndexMap;

use crate::io::fetch::FetchOutcome;
use crate::model::{Member, ScopeKey};
use crate::picker::{MemberContent, OptionEntry, member_options};

/// What happened to a delivered fetch result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Stored { count: usize },
    Failed { message: String },
    /// The scope was invalidated after the request went out
    Discarded,
}

/// Client-side cache of member details and per-project member lists.
///
/// A project list is either absent (never fetched, failed, or invalidated)
/// or present in full. At most one fetch per scope is in flight; each scope
/// carries a generation so results for an invalidated request are dropped.
#[derive(Debug, Default)]
pub struct MemberStore {
    members: IndexMap<String, Member>,
    project_members: HashMap<ScopeKey, Vec<String>>,
    in_flight: HashMap<ScopeKey, u64>,
    generations: HashMap<ScopeKey, u64>,
    errors: HashMap<ScopeKey, String>,
    fetched_at: HashMap<ScopeKey, DateTime<Local>>,
}

impl MemberStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn member(&self, id: &str) -> Option<&Member> {
        self.members.get(id)
    }

    pub fn project_member_ids(&self, scope: &ScopeKey) -> Option<&[String]> {
        self.project_members.get(scope).map(|ids| ids.as_slice())
    }

    pub fn is_loaded(&self, scope: &ScopeKey) -> bool {
        self.project_members.contains_key(scope)
    }

    pub fn is_fetching(&self, scope: &ScopeKey) -> bool {
        self.in_flight.contains_key(scope)
    }

    pub fn last_error(&self, scope: &ScopeKey) -> Option<&str> {
        self.errors.get(scope).map(|s| s.as_str())
    }

    pub fn fetched_at(&self, scope: &ScopeKey) -> Option<DateTime<Local>> {
        self.fetched_at.get(scope).copied()
    }

    fn generation(&self, scope: &ScopeKey) -> u64 {
        self.generations.get(scope).copied().unwrap_or(0)
    }

    /// Mark `scope` as in flight. Returns the generation to tag the request
    /// with, or `None` when the scope is loaded or already being fetched.
    pub fn begin_fetch(&mut self, scope: &ScopeKey) -> Option<u64> {
        if self.is_loaded(scope) || self.is_fetching(scope) {
            return None;
        }
        let generation = self.generation(scope);
        self.in_flight.insert(scope.clone(), generation);
        Some(generation)
    }

    /// Apply a finished fetch.
    pub fn complete_fetch(&mut self, outcome: FetchOutcome) -> Applied {
        let FetchOutcome {
            scope,
            generation,
            result,
        } = outcome;

        if self.in_flight.get(&scope) == Some(&generation) {
            self.in_flight.remove(&scope);
        }
        if generation != self.generation(&scope) {
            return Applied::Discarded;
        }

        match result {
            Ok(members) => {
                let ids: Vec<String> = members.iter().map(|m| m.id.clone()).collect();
                for member in members {
                    self.members.insert(member.id.clone(), member);
                }
                let count = ids.len();
                self.project_members.insert(scope.clone(), ids);
                self.errors.remove(&scope);
                self.fetched_at.insert(scope, Local::now());
                Applied::Stored { count }
            }
            Err(e) => {
                let message = e.to_string();
                self.errors.insert(scope, message.clone());
                Applied::Failed { message }
            }
        }
    }

    /// Forget the member list for `scope`. A pending fetch for it will be
    /// discarded when it lands and the next open fetches again.
    pub fn invalidate(&mut self, scope: &ScopeKey) {
        *self.generations.entry(scope.clone()).or_insert(0) += 1;
        self.project_members.remove(scope);
        self.in_flight.remove(scope);
        self.fetched_at.remove(scope);
        self.errors.remove(scope);
    }

    pub fn invalidate_all(&mut self) {
        let mut scopes: Vec<ScopeKey> = self.project_members.keys().cloned().collect();
        scopes.extend(self.in_flight.keys().cloned());
        scopes.extend(self.errors.keys().cloned());
        scopes.sort();
        scopes.dedup();
        for scope in &scopes {
            self.invalidate(scope);
        }
    }

    /// Option index for a scope, rebuilt from the current store contents.
    pub fn member_options(
        &self,
        scope: &ScopeKey,
        current_user: Option<&str>,
    ) -> Option<Vec<OptionEntry<String, MemberContent>>> {
        member_options(self.project_member_ids(scope), |id| self.member(id), current_user)
    }
}
