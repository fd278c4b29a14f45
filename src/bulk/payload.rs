//! Mutation payloads
//!
//! Each mutation kind has a typed payload with a fixed serialization, and its
//! required parameter is checked before a batch starts.

use crate::error::{Error, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

/// Tag key Intersight reads the license tier from
pub const LICENSE_TIER_TAG: &str = "Intersight.LicenseTier";

/// Management mode of a compute node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
pub enum ManagementMode {
    #[value(name = "IntersightStandalone")]
    IntersightStandalone,
    #[value(name = "UCSM")]
    #[serde(rename = "UCSM")]
    Ucsm,
    #[value(name = "Intersight")]
    Intersight,
}

impl ManagementMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ManagementMode::IntersightStandalone => "IntersightStandalone",
            ManagementMode::Ucsm => "UCSM",
            ManagementMode::Intersight => "Intersight",
        }
    }
}

/// Intersight license tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
pub enum LicenseTier {
    #[value(name = "Base")]
    Base,
    #[value(name = "Essentials")]
    Essentials,
    #[value(name = "Advantage")]
    Advantage,
    #[value(name = "Premier")]
    Premier,
}

impl LicenseTier {
    pub fn as_str(self) -> &'static str {
        match self {
            LicenseTier::Base => "Base",
            LicenseTier::Essentials => "Essentials",
            LicenseTier::Advantage => "Advantage",
            LicenseTier::Premier => "Premier",
        }
    }
}

/// Which bulk mutation to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    AssignManagementMode,
    ApplyLicense,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationKind::AssignManagementMode => f.write_str("assign-mode"),
            MutationKind::ApplyLicense => f.write_str("apply-license"),
        }
    }
}

/// Parameters as they arrive from the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct MutationParams {
    pub mode: Option<ManagementMode>,
    pub tier: Option<LicenseTier>,
}

impl MutationKind {
    /// Check the kind's required parameter and bind it.
    pub fn validate(self, params: MutationParams) -> Result<Mutation> {
        match self {
            MutationKind::AssignManagementMode => params
                .mode
                .map(Mutation::AssignManagementMode)
                .ok_or_else(|| Error::Configuration("--mode is required for assign-mode".into())),
            MutationKind::ApplyLicense => params
                .tier
                .map(Mutation::ApplyLicense)
                .ok_or_else(|| Error::Configuration("--tier is required for apply-license".into())),
        }
    }
}

/// A validated mutation, ready to be applied to any number of resources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    AssignManagementMode(ManagementMode),
    ApplyLicense(LicenseTier),
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::AssignManagementMode(_) => MutationKind::AssignManagementMode,
            Mutation::ApplyLicense(_) => MutationKind::ApplyLicense,
        }
    }

    /// The value recorded on success
    pub fn applied_value(&self) -> &'static str {
        match self {
            Mutation::AssignManagementMode(mode) => mode.as_str(),
            Mutation::ApplyLicense(tier) => tier.as_str(),
        }
    }

    pub fn payload(&self) -> MutationPayload {
        match *self {
            Mutation::AssignManagementMode(management_mode) => {
                MutationPayload::ManagementMode(ManagementModePayload { management_mode })
            }
            Mutation::ApplyLicense(tier) => MutationPayload::LicenseTags(LicenseTagPayload {
                tags: vec![Tag {
                    key: LICENSE_TIER_TAG,
                    value: tier,
                }],
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManagementModePayload {
    pub management_mode: ManagementMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: &'static str,
    pub value: LicenseTier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LicenseTagPayload {
    pub tags: Vec<Tag>,
}

/// Request body of one mutation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MutationPayload {
    ManagementMode(ManagementModePayload),
    LicenseTags(LicenseTagPayload),
}
