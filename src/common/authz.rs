// src/common/authz.rs

use crate::{
    common::error::AppError,
    models::{auth::Principal, lease::Lease, property::Property},
};

/// Relação que o principal precisa ter com o contrato.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Locador dono do contrato (ou admin)
    Landlord,
    /// O inquilino do contrato, e só ele
    Tenant,
    /// Qualquer parte do contrato (ou admin)
    Participant,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Access<'a> {
    Allowed(&'a Principal),
    Unauthorized(&'static str),
    Unauthenticated,
}

impl<'a> Access<'a> {
    pub fn into_result(self) -> Result<&'a Principal, AppError> {
        match self {
            Access::Allowed(principal) => Ok(principal),
            Access::Unauthorized(reason) => Err(AppError::Unauthorized(reason.to_string())),
            Access::Unauthenticated => Err(AppError::Unauthenticated),
        }
    }
}

/// Predicado único de autorização usado por todas as operações do núcleo.
/// Sem principal resolvido a resposta é sempre `Unauthenticated`.
pub fn can_act<'a>(principal: Option<&'a Principal>, lease: &Lease, relation: Relation) -> Access<'a> {
    let Some(principal) = principal else {
        return Access::Unauthenticated;
    };

    let allowed = match relation {
        Relation::Landlord => principal.is_admin() || lease.landlord_id == principal.id,
        Relation::Tenant => lease.tenant_id == principal.id,
        Relation::Participant => principal.is_admin() || lease.is_participant(principal.id),
    };

    if allowed {
        return Access::Allowed(principal);
    }

    Access::Unauthorized(match relation {
        Relation::Landlord => "apenas o locador do contrato pode realizar esta ação",
        Relation::Tenant => "apenas o inquilino do contrato pode realizar esta ação",
        Relation::Participant => "você não participa deste contrato",
    })
}

/// Mesmo predicado para o imóvel (criação de contratos).
pub fn can_manage_property<'a>(principal: Option<&'a Principal>, property: &Property) -> Access<'a> {
    match principal {
        None => Access::Unauthenticated,
        Some(p) if p.is_admin() || property.landlord_id == p.id => Access::Allowed(p),
        Some(_) => Access::Unauthorized("apenas o locador do imóvel pode criar contratos para ele"),
    }
}

/// Operações de sistema (varreduras manuais) exigem admin.
pub fn require_admin(principal: Option<&Principal>) -> Result<&Principal, AppError> {
    match principal {
        None => Err(AppError::Unauthenticated),
        Some(p) if p.is_admin() => Ok(p),
        Some(_) => Err(AppError::Unauthorized(
            "apenas administradores podem executar esta ação".to_string(),
        )),
    }
}
