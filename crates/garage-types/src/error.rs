//! Error types for the virtual garage

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),
}

/// Rejected input when building or validating a model value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("O modelo do veículo não pode ser vazio.")]
    EmptyModel,

    #[error("A capacidade de carga deve ser um número positivo.")]
    InvalidCapacity,

    #[error("A velocidade máxima deve ser um número positivo.")]
    InvalidTopSpeed,

    #[error("Data da manutenção inválida ou não informada.")]
    InvalidDate,

    #[error("O tipo de serviço da manutenção não pode ser vazio.")]
    EmptyKind,
}

/// A driving or cargo action the vehicle refused
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VehicleError {
    #[error("O veículo está desligado. Ligue-o primeiro.")]
    IgnitionOff,

    #[error("Já está na velocidade máxima ({max_speed:.0} km/h).")]
    AtMaxSpeed { max_speed: f64 },

    #[error("Carga excede a capacidade: {requested:.1} + {current:.1} > {capacity:.1}.")]
    ExceedsCapacity {
        requested: f64,
        current: f64,
        capacity: f64,
    },

    #[error("Carga insuficiente para descarregar {requested:.1} (atual: {current:.1}).")]
    InsufficientCargo { requested: f64, current: f64 },

    #[error("Quantidade de carga inválida.")]
    InvalidAmount,

    #[error("O turbo já foi usado.")]
    BoostAlreadyUsed,

    #[error("O veículo precisa estar em movimento para usar o turbo.")]
    NotMoving,

    #[error("Operação não suportada por este veículo: {0}")]
    NotSupported(&'static str),
}

/// Garage-level rejection of a mutation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GarageError {
    #[error("Um veículo com o ID {0} já existe.")]
    DuplicateId(String),

    #[error("Já existe um {model} {color} na garagem.")]
    DuplicateModelColor { model: String, color: String },

    #[error("Veículo não encontrado: {0}")]
    NotFound(String),

    #[error("Nenhum veículo selecionado.")]
    NoSelection,

    #[error("Manutenção não encontrada: {0}")]
    MaintenanceNotFound(String),
}

/// Key-value store failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Store quota exceeded while writing '{0}'")]
    QuotaExceeded(String),

    #[error("Store IO error: {0}")]
    Io(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Vehicle(#[from] VehicleError),

    #[error("{0}")]
    Garage(#[from] GarageError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, Error>;
