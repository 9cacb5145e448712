//! The ordered player API suite.
//!
//! Six steps share one [`SuiteContext`] and always run in [`STEPS`] order. A
//! step that errors or is skipped does not stop the ones after it. Checks are
//! soft and only turn into a failure in [`SuiteReport::into_result`], after
//! teardown has deleted whatever players are still tracked.

use std::{collections::HashSet, fmt, time::Duration};

use anyhow::{Context, anyhow};
use rand::{SeedableRng, rngs::StdRng};
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    auth::{AuthToken, Credentials},
    client::ApiClient,
    config::{Config, SuiteSettings},
    error::{FailureSummary, SuiteError},
    fake::PlayerFaker,
    player::{Player, PlayerId, PlayerLookupRequest},
    schema::player_response_schema,
    soft::{Assertion, SoftAssertions},
    util::{get_str, has_value, json_type_name},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Login,
    CreatePlayers,
    GetOnePlayer,
    ListSortedByName,
    DeletePlayers,
    VerifyEmpty,
}

pub const STEPS: [Step; 6] = [
    Step::Login,
    Step::CreatePlayers,
    Step::GetOnePlayer,
    Step::ListSortedByName,
    Step::DeletePlayers,
    Step::VerifyEmpty,
];

impl Step {
    pub fn name(self) -> &'static str {
        match self {
            Step::Login => "Get user token",
            Step::CreatePlayers => "Register players",
            Step::GetOnePlayer => "Get one player profile",
            Step::ListSortedByName => "Get all players sorted by name",
            Step::DeletePlayers => "Delete all created players",
            Step::VerifyEmpty => "Verify all players are deleted",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug)]
pub enum StepError {
    /// The step's precondition does not hold; it is skipped, not failed.
    #[error("assumption not met: {0}")]
    Assumption(String),

    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Ran to the end. Its soft assertions may still have failed.
    Completed,
    Skipped(String),
    Errored(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub step: Step,
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupFailure {
    pub id: PlayerId,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct SuiteReport {
    pub steps: Vec<StepRecord>,
    pub assertions_checked: usize,
    pub failed_assertions: Vec<Assertion>,
    pub cleanup_failures: Vec<CleanupFailure>,
    /// Set to the configured limit when the steps did not finish in time.
    pub timed_out: Option<Duration>,
}

impl SuiteReport {
    pub fn outcome(&self, step: Step) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|record| record.step == step)
            .map(|record| &record.outcome)
    }

    pub fn step_errors(&self) -> Vec<(String, String)> {
        self.steps
            .iter()
            .filter_map(|record| match &record.outcome {
                StepOutcome::Errored(message) => {
                    Some((record.step.name().to_string(), message.clone()))
                }
                _ => None,
            })
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.timed_out.is_none() && self.failed_assertions.is_empty() && self.step_errors().is_empty()
    }

    /// Cleanup failures are reported but never fail the run.
    pub fn into_result(self) -> Result<(), SuiteError> {
        let summary = FailureSummary {
            step_errors: self.step_errors(),
            assertions: self.failed_assertions,
        };
        if let Some(limit) = self.timed_out {
            return Err(SuiteError::Timeout { limit, summary });
        }
        if summary.is_empty() {
            Ok(())
        } else {
            Err(SuiteError::Failed(summary))
        }
    }
}

pub struct SuiteContext {
    client: ApiClient,
    credentials: Credentials,
    settings: SuiteSettings,
    faker: PlayerFaker<StdRng>,
    created: Vec<Player>,
    /// Ids of created players whose response body did not decode.
    orphaned: Vec<PlayerId>,
    soft: SoftAssertions,
}

impl SuiteContext {
    pub fn new(base_url: &str, credentials: Credentials, settings: SuiteSettings) -> Self {
        let faker = PlayerFaker::new(StdRng::from_os_rng(), settings.currency_code.clone());
        Self {
            client: ApiClient::anonymous(base_url),
            credentials,
            settings,
            faker,
            created: Vec::new(),
            orphaned: Vec::new(),
            soft: SoftAssertions::new(),
        }
    }

    /// Resolves base URL and tester credentials up front; any missing value
    /// stops the suite before the first request.
    pub fn from_config(config: &Config, settings: SuiteSettings) -> Result<Self, SuiteError> {
        let base_url = config.base_url()?;
        let credentials = Credentials::new(config.tester_email()?, config.tester_password()?);
        Ok(Self::new(base_url, credentials, settings))
    }

    pub fn with_faker(mut self, faker: PlayerFaker<StdRng>) -> Self {
        self.faker = faker;
        self
    }

    pub fn tracked(&self) -> &[Player] {
        &self.created
    }

    pub fn orphaned(&self) -> &[PlayerId] {
        &self.orphaned
    }

    fn leftover_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.created
            .iter()
            .map(|player| player.id)
            .chain(self.orphaned.iter().copied())
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn assertions(&self) -> &SoftAssertions {
        &self.soft
    }

    /// Runs every step, then teardown, then flushes the soft assertions into
    /// the report.
    pub async fn run(mut self) -> SuiteReport {
        let limit = self.settings.timeout;
        let mut steps = Vec::with_capacity(STEPS.len());

        let timed_out = tokio::time::timeout(limit, self.run_steps(&mut steps))
            .await
            .is_err();
        if timed_out {
            error!(?limit, completed = steps.len(), "Suite timed out, aborting remaining steps");
        }

        let teardown = tokio::time::timeout(limit, self.teardown()).await;
        let cleanup_failures = match teardown {
            Ok(failures) => failures,
            Err(_) => {
                let remaining: Vec<CleanupFailure> = self
                    .leftover_ids()
                    .map(|id| CleanupFailure {
                        id,
                        reason: "teardown timed out".to_string(),
                    })
                    .collect();
                error!(?limit, remaining = remaining.len(), "Teardown timed out");
                remaining
            }
        };

        let assertions_checked = self.soft.recorded().len();
        let failed_assertions = self.soft.flush().err().unwrap_or_default();

        let report = SuiteReport {
            steps,
            assertions_checked,
            failed_assertions,
            cleanup_failures,
            timed_out: timed_out.then_some(limit),
        };
        info!(
            checked = report.assertions_checked,
            failed = report.failed_assertions.len(),
            step_errors = report.step_errors().len(),
            cleanup_failures = report.cleanup_failures.len(),
            "Suite finished"
        );
        report
    }

    async fn run_steps(&mut self, records: &mut Vec<StepRecord>) {
        for step in STEPS {
            info!(step = step.name(), "Starting step");
            let outcome = match self.run_step(step).await {
                Ok(()) => StepOutcome::Completed,
                Err(StepError::Assumption(reason)) => {
                    warn!(step = step.name(), %reason, "Step skipped");
                    StepOutcome::Skipped(reason)
                }
                Err(StepError::Failed(err)) => {
                    let message = format!("{err:#}");
                    error!(step = step.name(), error = %message, "Step errored");
                    StepOutcome::Errored(message)
                }
            };
            info!(step = step.name(), ?outcome, "Finished step");
            records.push(StepRecord { step, outcome });
        }
    }

    pub async fn run_step(&mut self, step: Step) -> Result<(), StepError> {
        match step {
            Step::Login => self.login().await,
            Step::CreatePlayers => self.create_players().await,
            Step::GetOnePlayer => self.get_one_player().await,
            Step::ListSortedByName => self.list_sorted_by_name().await,
            Step::DeletePlayers => self.delete_players().await,
            Step::VerifyEmpty => self.verify_empty().await,
        }
    }

    async fn login(&mut self) -> Result<(), StepError> {
        let response = self.client.login(&self.credentials).await?;
        self.soft.assert_eq("login status", 200, response.status_code());

        let body = response.value()?;
        // Report the token's type, never its value.
        let actual = match get_str(&body, "accessToken") {
            Some(_) => "string",
            None => body.get("accessToken").map_or("absent", json_type_name),
        };
        self.soft.assert_that(
            "login response contains accessToken",
            has_value(&body, "accessToken"),
            "non-null accessToken",
            actual,
        );

        let token: AuthToken =
            serde_json::from_value(body).context("Failed to decode login response")?;
        match token.access_token() {
            Some(token) => {
                self.client = self.client.with_token(token);
                info!("Authenticated as tester");
            }
            None => warn!("Login returned no access token, continuing unauthenticated"),
        }
        Ok(())
    }

    async fn create_players(&mut self) -> Result<(), StepError> {
        let schema = player_response_schema().context("Bundled player schema is invalid")?;
        let count = self.settings.players_to_create;
        let mut ids = HashSet::with_capacity(count);

        for i in 1..=count {
            let request = self.faker.next_request();
            let response = self.client.create_player(&request).await?;

            self.soft
                .assert_eq(format!("create #{i} status"), 201, response.status_code());
            self.soft.assert_ok(
                format!("create #{i} response schema"),
                &schema.validate_str(response.body()),
            );

            let body = response.value()?;
            self.soft.assert_that(
                format!("create #{i} id present"),
                has_value(&body, "id"),
                "non-null id",
                body.get("id")
                    .map_or_else(|| "absent".to_string(), ToString::to_string),
            );

            let player: Player = match serde_json::from_value(body.clone()) {
                Ok(player) => player,
                Err(err) => {
                    // The server may still have created it; keep the id for teardown.
                    if let Some(id) = body
                        .get("id")
                        .and_then(|id| serde_json::from_value::<PlayerId>(id.clone()).ok())
                    {
                        warn!(%id, "Created player did not decode, tracking its id for cleanup");
                        self.orphaned.push(id);
                    }
                    return Err(anyhow::Error::new(err)
                        .context(format!("Failed to decode created player #{i}"))
                        .into());
                }
            };
            self.soft
                .assert_eq(format!("create #{i} username"), &request.username, &player.username);
            self.soft
                .assert_eq(format!("create #{i} email"), &request.email, &player.email);
            self.soft
                .assert_eq(format!("create #{i} name"), &request.name, &player.name);
            self.soft
                .assert_eq(format!("create #{i} surname"), &request.surname, &player.surname);

            ids.insert(player.id);
            info!(id = %player.id, email = %player.email, "Created player");
            self.created.push(player);
        }

        self.soft
            .assert_eq("created ids are distinct", count, ids.len());
        Ok(())
    }

    async fn get_one_player(&mut self) -> Result<(), StepError> {
        let first = self
            .created
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("No tracked player to look up"))?;

        let response = self
            .client
            .get_one_player(&PlayerLookupRequest::from(&first))
            .await?;
        self.soft.assert_eq("get one status", 200, response.status_code());

        let schema = player_response_schema().context("Bundled player schema is invalid")?;
        self.soft.assert_ok(
            "get one response schema",
            &schema.validate_str(response.body()),
        );

        let player: Player = response.json()?;
        self.soft
            .assert_eq("get one returns the tracked player", &first, &player);
        Ok(())
    }

    async fn list_sorted_by_name(&mut self) -> Result<(), StepError> {
        let response = self.client.get_all_players().await?;
        self.soft.assert_eq("get all status", 200, response.status_code());

        let players: Vec<Player> = response.json()?;
        self.soft.assert_eq(
            "get all player count",
            self.settings.players_to_create,
            players.len(),
        );

        // The API is expected to return players already ordered by name.
        let returned: Vec<&str> = players.iter().map(|p| p.name.as_str()).collect();
        let mut sorted = returned.clone();
        sorted.sort();
        self.soft
            .assert_eq("get all is sorted by name", sorted, returned);
        Ok(())
    }

    async fn delete_players(&mut self) -> Result<(), StepError> {
        if self.created.is_empty() {
            return Err(StepError::Assumption("no tracked players to delete".into()));
        }

        #[derive(Deserialize)]
        struct Deleted {
            id: PlayerId,
        }

        let snapshot = self.created.clone();
        for player in snapshot {
            let response = self.client.delete_player(player.id).await?;
            let ok = self.soft.assert_eq(
                format!("delete {} status", player.id),
                200,
                response.status_code(),
            );

            let deleted: Deleted = response.json()?;
            self.soft
                .assert_eq(format!("delete {} returned id", player.id), player.id, deleted.id);

            if ok {
                self.created.retain(|tracked| tracked.id != player.id);
                info!(id = %player.id, "Deleted player");
            }
        }
        Ok(())
    }

    async fn verify_empty(&mut self) -> Result<(), StepError> {
        let response = self.client.get_all_players().await?;
        self.soft
            .assert_eq("get all after delete status", 200, response.status_code());

        let players: Vec<Player> = response.json()?;
        let ids: Vec<String> = players.iter().map(|p| p.id.to_string()).collect();
        self.soft.assert_that(
            "no players remain",
            players.is_empty(),
            "[]",
            format!("[{}]", ids.join(", ")),
        );
        Ok(())
    }

    /// Deletes every player still tracked, including orphaned ids. Failures
    /// are logged and collected, never raised.
    pub async fn teardown(&mut self) -> Vec<CleanupFailure> {
        let mut failures = Vec::new();
        loop {
            let Some(id) = self.leftover_ids().next() else {
                break;
            };
            let reason = match self.client.delete_player(id).await {
                Ok(response) if response.status().is_success() => None,
                Ok(response) => Some(format!(
                    "status {}: {}",
                    response.status_code(),
                    response.body()
                )),
                Err(err) => Some(format!("{err:#}")),
            };
            match reason {
                None => info!(%id, "Cleaned up leftover player"),
                Some(reason) => {
                    error!(%id, %reason, "Error deleting player during cleanup");
                    failures.push(CleanupFailure { id, reason });
                }
            }
            if self.created.is_empty() {
                self.orphaned.remove(0);
            } else {
                self.created.remove(0);
            }
        }
        failures
    }
}

/// Resolves configuration and runs the whole suite.
pub async fn run_suite(config: &Config, settings: SuiteSettings) -> Result<SuiteReport, SuiteError> {
    let context = SuiteContext::from_config(config, settings)?;
    Ok(context.run().await)
}
