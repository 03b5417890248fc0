// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Classification policy — the pure decision function gating every vault
// operation.
//
// Rules:
//   - Download requires clearance >= classification; that check comes first,
//     so an under-cleared user is denied InsufficientClearance whatever
//     their role.  With sufficient clearance, auditors are still denied —
//     they never read document content.  Administrators get no clearance
//     bypass for content either.
//   - Upload and Delete require the Officer or Administrator role.
//   - AuditRead is restricted to Auditor and Administrator.
//   - ListMetadata covers document metadata only; Administrators list across
//     all levels, Officers are filtered to clearance by the vault.

use strongroom_core::error::DenyReason;
use strongroom_core::types::{ClassificationLevel, Role, User, VaultAction};

/// Outcome of an authorization check.  Every denial carries a
/// machine-readable reason for the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decide whether `user` may perform `action` on content classified at
/// `classification`.
///
/// Pure and total: every (user, classification, action) triple maps to
/// exactly one decision, with no side effects and no errors.  For actions
/// that are not about one document's content (audit reads, metadata
/// listing), `classification` is ignored.
pub fn authorize(
    user: &User,
    classification: ClassificationLevel,
    action: VaultAction,
) -> Decision {
    match action {
        VaultAction::Upload | VaultAction::Delete => match user.role {
            Role::Officer | Role::Administrator => Decision::Allow,
            Role::Auditor => Decision::Deny(DenyReason::RoleNotPermitted),
        },

        VaultAction::Download => {
            if user.clearance < classification {
                Decision::Deny(DenyReason::InsufficientClearance)
            } else {
                match user.role {
                    Role::Auditor => Decision::Deny(DenyReason::RoleNotPermitted),
                    Role::Officer | Role::Administrator => Decision::Allow,
                }
            }
        }

        VaultAction::AuditRead => match user.role {
            Role::Auditor | Role::Administrator => Decision::Allow,
            Role::Officer => Decision::Deny(DenyReason::RoleNotPermitted),
        },

        VaultAction::ListMetadata => match user.role {
            Role::Officer | Role::Administrator => Decision::Allow,
            Role::Auditor => Decision::Deny(DenyReason::RoleNotPermitted),
        },
    }
}
