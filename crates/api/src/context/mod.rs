//! Application context - dependency injection container

use std::sync::Arc;

use preppulse_core::{
    MeetingClassifier, Notifier, ScanCoordinator, SyncEngine, TriggerHandler,
};
use preppulse_domain::{Config, Result};
use preppulse_infra::integrations::calendar::tokens::EnvTokenSource;
use preppulse_infra::integrations::calendar::AccessTokenSource;
use preppulse_infra::{
    DbManager, EmailApiClient, GoogleCalendarSource, HttpTriggerPublisher,
    SlackClient, SqliteMeetingRepository, SqliteUserRepository, TwilioClient,
};

/// Application context - holds all services and dependencies.
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub meetings: Arc<SqliteMeetingRepository>,
    pub users: Arc<SqliteUserRepository>,
    pub coordinator: Arc<ScanCoordinator>,
    pub trigger_handler: Arc<TriggerHandler>,
}

impl AppContext {
    /// Wire the full pipeline from configuration.
    ///
    /// Opens the database pool, runs migrations, and builds the classifier,
    /// sync engine, scan coordinator, trigger handler, and channel
    /// providers. Unconfigured channels are wired anyway; the notifier
    /// filters them out per send.
    pub fn new(config: Config) -> Result<Self> {
        let db = Arc::new(DbManager::new(
            &config.database.path,
            config.database.pool_size,
            config.database.encryption_key.as_deref(),
        )?);
        db.run_migrations()?;

        let meetings = Arc::new(SqliteMeetingRepository::new(db.clone()));
        let users = Arc::new(SqliteUserRepository::new(db.clone()));

        let classifier = Arc::new(MeetingClassifier::new(config.classification.clone()));

        let tokens: Arc<dyn AccessTokenSource> = Arc::new(EnvTokenSource::default());
        let calendar = match &config.channels.calendar_api_url {
            Some(base) => Arc::new(GoogleCalendarSource::with_api_base(tokens, base)?),
            None => Arc::new(GoogleCalendarSource::new(tokens)?),
        };

        let event_bus_url = config
            .channels
            .event_bus_url
            .clone()
            .unwrap_or_else(|| format!("http://{}/v1/triggers", config.server.bind_addr));
        let publisher = Arc::new(HttpTriggerPublisher::new(event_bus_url)?);

        let engine = Arc::new(
            SyncEngine::new(classifier.clone(), meetings.clone(), calendar, publisher)
                .with_lookahead_days(config.scan.lookahead_days),
        );
        let coordinator = Arc::new(ScanCoordinator::new(users.clone(), engine));

        let slack = SlackClient::new(config.channels.slack_bot_token.clone())?;
        let twilio = TwilioClient::new(
            config.channels.twilio_account_sid.clone(),
            config.channels.twilio_auth_token.clone(),
            config.channels.twilio_from_number.clone(),
        )?;
        let email = EmailApiClient::new(
            config.channels.email_api_url.clone(),
            config.channels.email_api_key.clone(),
            config.channels.email_from_address.clone(),
        )?;
        let notifier = Arc::new(Notifier::new(Arc::new(slack), Arc::new(twilio), Arc::new(email)));

        let trigger_handler =
            Arc::new(TriggerHandler::new(meetings.clone(), users.clone(), notifier));

        Ok(Self { config, db, meetings, users, coordinator, trigger_handler })
    }
}
