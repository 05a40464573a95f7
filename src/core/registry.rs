use crate::core::actions::Action;
use crate::domain::model::ActionSpec;
use crate::utils::error::CompileError;
use rand::Rng;
use std::collections::HashMap;

/// 依欄位位置排列的動作（CSV 模式）。任何一個動作編譯失敗就整批失敗。
pub fn positional<R: Rng>(specs: &[ActionSpec], rng: &mut R) -> Result<Vec<Action>, CompileError> {
    specs
        .iter()
        .map(|spec| Action::compile(spec, rng))
        .collect()
}

/// 依 jsonField 索引的動作（JSON 模式）。每個動作都必須有非空的 jsonField。
pub fn keyed<R: Rng>(
    specs: &[ActionSpec],
    rng: &mut R,
) -> Result<HashMap<String, Action>, CompileError> {
    let mut actions = HashMap::with_capacity(specs.len());

    for (position, spec) in specs.iter().enumerate() {
        let key = match spec.json_field.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => return Err(CompileError::MissingFieldKey { position }),
        };
        let action = Action::compile(spec, rng)?;
        if actions.insert(key.to_string(), action).is_some() {
            tracing::warn!(
                "Field '{}' has more than one action, keeping action #{}",
                key,
                position
            );
        }
    }

    Ok(actions)
}
