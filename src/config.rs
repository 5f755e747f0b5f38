// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{AppointmentRepository, CampaignRepository, DealRepository, LeadRepository, StatsRepository, UserRepository},
    services::{
        AdminService, AppointmentService, CampaignService, CloserService, DealService, LeadService,
        ReportService,
    },
};

const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:3001";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 3;

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// Vazio = qualquer origem
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| DEFAULT_SERVER_ADDR.to_string());

        let max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(v) => v
                .parse()
                .context("DATABASE_MAX_CONNECTIONS deve ser um número")?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };
        let acquire_timeout_secs = match env::var("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            Ok(v) => v
                .parse()
                .context("DATABASE_ACQUIRE_TIMEOUT_SECS deve ser um número")?,
            Err(_) => DEFAULT_ACQUIRE_TIMEOUT_SECS,
        };

        Ok(Self {
            database_url,
            server_addr,
            max_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
            cors_origins: parse_origins(&env::var("CORS_ORIGINS").unwrap_or_default()),
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: Arc<I18nStore>,
    pub campaign_service: CampaignService,
    pub lead_service: LeadService,
    pub appointment_service: AppointmentService,
    pub deal_service: DealService,
    pub report_service: ReportService,
    pub admin_service: AdminService,
    pub closer_service: CloserService,
}

impl AppState {
    /// Conecta ao banco e monta o estado.
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool))
    }

    /// Monta o gráfico de dependências sobre um pool já criado.
    pub fn with_pool(db_pool: PgPool) -> Self {
        let users = UserRepository::new();
        let campaigns = CampaignRepository::new();
        let leads = LeadRepository::new();
        let appointments = AppointmentRepository::new();
        let deals = DealRepository::new();
        let stats = StatsRepository::new();

        Self {
            db_pool,
            i18n_store: Arc::new(I18nStore::new()),
            campaign_service: CampaignService::new(campaigns.clone()),
            lead_service: LeadService::new(
                leads.clone(),
                campaigns.clone(),
                appointments.clone(),
                users.clone(),
                deals.clone(),
            ),
            appointment_service: AppointmentService::new(
                appointments.clone(),
                leads.clone(),
                users.clone(),
                deals.clone(),
            ),
            deal_service: DealService::new(deals.clone(), appointments.clone(), leads.clone(), users.clone()),
            report_service: ReportService::new(
                users.clone(),
                deals.clone(),
                appointments.clone(),
                leads.clone(),
                stats.clone(),
            ),
            admin_service: AdminService::new(
                users.clone(),
                leads.clone(),
                appointments.clone(),
                deals.clone(),
                stats,
            ),
            closer_service: CloserService::new(users, appointments, leads, campaigns, deals),
        }
    }
}
