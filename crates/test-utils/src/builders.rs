#![allow(dead_code)]

use std::collections::BTreeMap;

use buildd::types::BuildRequest;

/// Builder for `BuildRequest` to simplify test setup.
pub struct BuildRequestBuilder {
    request: BuildRequest,
}

impl BuildRequestBuilder {
    pub fn new(repository: &str, commit: &str) -> Self {
        Self {
            request: BuildRequest {
                repository: repository.to_string(),
                commit: commit.to_string(),
                environment: BTreeMap::new(),
                ..Default::default()
            },
        }
    }

    pub fn build_step(mut self, command: &[&str]) -> Self {
        self.request.build_steps.push(tokens(command));
        self
    }

    pub fn publish_step(mut self, command: &[&str]) -> Self {
        self.request.publish_steps.push(tokens(command));
        self
    }

    pub fn artifacts(mut self, pattern: &str) -> Self {
        self.request.artifact_pattern = Some(pattern.to_string());
        self
    }

    pub fn token(mut self, token: &str) -> Self {
        self.request.access_token = Some(token.to_string());
        self
    }

    pub fn env(mut self, name: &str, value: &str) -> Self {
        self.request.environment.insert(name.to_string(), value.to_string());
        self
    }

    pub fn build(self) -> BuildRequest {
        self.request
    }
}

fn tokens(command: &[&str]) -> Vec<String> {
    command.iter().map(|s| s.to_string()).collect()
}
