//! Test entity and a spy repository that records every call

#![allow(dead_code)]

use recordkit_core::{
    ActionResult, Entity, ExError, ExErrorKind, FieldAccess, FieldAccessError, FieldValue,
    IdentityStrategy, QueryResult, Repository, Result, RowValues,
};
use std::cell::RefCell;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    pub item_id: Option<i64>,
    pub label: String,
}

impl Item {
    pub fn labelled(label: &str) -> Self {
        Self {
            item_id: None,
            label: label.to_string(),
        }
    }
}

impl FieldAccess for Item {
    fn get_field(&self, name: &str) -> std::result::Result<FieldValue, FieldAccessError> {
        match name {
            "ItemId" => Ok(self.item_id.into()),
            _ => Err(FieldAccessError::missing("Item", name)),
        }
    }

    fn set_field(&mut self, name: &str, value: FieldValue) -> std::result::Result<(), FieldAccessError> {
        match name {
            "ItemId" => self.item_id = value.as_opt_i64(name)?,
            _ => return Err(FieldAccessError::missing("Item", name)),
        }
        Ok(())
    }
}

impl Entity for Item {
    fn entity_name() -> &'static str {
        "Item"
    }

    fn identity() -> IdentityStrategy {
        IdentityStrategy::sequential_for("Item")
    }

    fn to_params(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("ItemId", self.item_id.into()),
            ("Label", self.label.as_str().into()),
        ]
    }

    fn from_row(row: &RowValues) -> std::result::Result<Self, FieldAccessError> {
        Ok(Item {
            item_id: row.get_opt_i64("ItemId")?,
            label: row.get_text("Label")?,
        })
    }
}

/// How the spy answers every call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpyMode {
    /// SUCCESS with the input given id 7 and a suffixed label
    Succeed,
    /// ERROR result
    Reject,
    /// Sharp failure
    Fail,
}

pub struct SpyRepository {
    mode: SpyMode,
    calls: RefCell<Vec<String>>,
}

impl SpyRepository {
    pub fn new(mode: SpyMode) -> Self {
        Self {
            mode,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn answer(&self, op: &str, entity: &Item) -> Result<ActionResult<Item>> {
        self.calls.borrow_mut().push(op.to_string());
        match self.mode {
            SpyMode::Succeed => Ok(ActionResult::success(Item {
                item_id: Some(7),
                label: format!("{}-stored", entity.label),
            })),
            SpyMode::Reject => Ok(ActionResult::failed(
                ExError::new(ExErrorKind::NotFound)
                    .with_op(op)
                    .with_message("record not found"),
            )),
            SpyMode::Fail => Err(ExError::new(ExErrorKind::Persistence)
                .with_op(op)
                .with_message("disk I/O error")),
        }
    }
}

impl Repository<Item> for SpyRepository {
    fn create(&self, entity: &Item) -> Result<ActionResult<Item>> {
        self.answer("create", entity)
    }

    fn fetch(&self, entity: &Item) -> Result<ActionResult<Item>> {
        self.answer("fetch", entity)
    }

    fn update(&self, entity: &Item) -> Result<ActionResult<Item>> {
        self.answer("update", entity)
    }

    fn delete(&self, entity: &Item) -> Result<ActionResult<Item>> {
        self.answer("delete", entity)
    }

    fn find_where(&self, _filter: &str) -> Result<QueryResult<Item>> {
        self.calls.borrow_mut().push("find_where".to_string());
        Ok(QueryResult::no_records("no records found"))
    }
}
