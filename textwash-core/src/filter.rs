//! Filtro de entidades: descarta não-entidades e "palavras" de baixa qualidade.

use crate::prediction::MergedEntity;

/// A entidade sobrevive ao filtro?
///
/// Regras: rótulo diferente de `NONE`, mais de um caractere e somente
/// caracteres alfanuméricos.
pub fn keep_entity(entity: &MergedEntity) -> bool {
    entity.is_entity()
        && entity.word.chars().count() > 1
        && entity.word.chars().all(char::is_alphanumeric)
}

/// Aplica [`keep_entity`] preservando a ordem da decodificação.
pub fn filter_entities(entities: Vec<MergedEntity>) -> Vec<MergedEntity> {
    entities.into_iter().filter(keep_entity).collect()
}
