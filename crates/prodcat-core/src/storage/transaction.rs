//! Template transactions.
//!
//! Template writes are staged in a write cache. On commit the registered save
//! hooks see the staged templates; only if every hook passes are the writes
//! applied, atomically, across the template and link trees.

use std::collections::{BTreeSet, HashMap};

use sled::transaction::TransactionError;
use sled::Transactional;
use tracing::{info, instrument, warn};

use super::engine::tx_result;
use super::key::{encode_u64, LinkKey};
use super::record::TemplateRecord;
use super::Store;
use crate::error::Error;
use crate::hook::{HookRegistry, SaveContext};
use crate::model::{CategoryId, NewTemplate, Template, TemplateId};

/// A staged template operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateOp {
    /// Create a template.
    Create(TemplateId),
    /// Overwrite a template.
    Write(TemplateId),
    /// Delete a template and its links.
    Delete(TemplateId),
}

impl TemplateOp {
    fn id(&self) -> TemplateId {
        match self {
            TemplateOp::Create(id) | TemplateOp::Write(id) | TemplateOp::Delete(id) => *id,
        }
    }
}

/// Final stored state of one template after commit.
struct PlannedWrite {
    id: TemplateId,
    record: Option<Vec<u8>>,
    old_links: Vec<CategoryId>,
    new_links: BTreeSet<CategoryId>,
}

/// A transaction over product templates.
pub struct Transaction<'a> {
    store: &'a Store,
    ops: Vec<TemplateOp>,
    /// Staged state per template (`None` = deleted).
    write_cache: HashMap<TemplateId, Option<Template>>,
}

impl<'a> Transaction<'a> {
    /// Create a new transaction.
    pub(crate) fn new(store: &'a Store) -> Self {
        Self {
            store,
            ops: Vec::new(),
            write_cache: HashMap::new(),
        }
    }

    /// Stage a new template and return its id.
    pub fn create(&mut self, template: NewTemplate) -> Result<TemplateId, Error> {
        let id = TemplateId(self.store.generate_id()?);
        self.write_cache.insert(id, Some(template.into_template(id)));
        self.ops.push(TemplateOp::Create(id));
        Ok(id)
    }

    /// Stage a full overwrite of an existing template.
    pub fn write(&mut self, template: Template) -> Result<&mut Self, Error> {
        if self.read(template.id)?.is_none() {
            return Err(Error::NotFound {
                entity: "template",
                id: template.id.0,
            });
        }

        let id = template.id;
        self.write_cache.insert(id, Some(template));
        self.ops.push(TemplateOp::Write(id));
        Ok(self)
    }

    /// Stage a template deletion.
    pub fn delete(&mut self, id: TemplateId) -> &mut Self {
        self.write_cache.insert(id, None);
        self.ops.push(TemplateOp::Delete(id));
        self
    }

    /// Read a template, seeing this transaction's staged writes.
    pub fn read(&self, id: TemplateId) -> Result<Option<Template>, Error> {
        match self.write_cache.get(&id) {
            Some(cached) => Ok(cached.clone()),
            None => self.store.template(id),
        }
    }

    /// Get the staged operations.
    pub fn operations(&self) -> &[TemplateOp] {
        &self.ops
    }

    /// Get the number of staged operations.
    pub fn operation_count(&self) -> usize {
        self.ops.len()
    }

    /// Templates that will exist after commit, in first-touched order.
    pub fn pending(&self) -> Vec<Template> {
        self.touched()
            .into_iter()
            .filter_map(|id| self.write_cache.get(&id).cloned().flatten())
            .collect()
    }

    fn touched(&self) -> Vec<TemplateId> {
        let mut seen = BTreeSet::new();
        self.ops
            .iter()
            .map(TemplateOp::id)
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Run the save hooks and apply the staged writes atomically.
    ///
    /// A hook failure discards every staged write. Returns the ids of the
    /// templates that exist after the commit.
    #[instrument(skip_all, fields(ops = self.ops.len()))]
    pub fn commit(
        self,
        hooks: &HookRegistry,
        ctx: &SaveContext,
    ) -> Result<Vec<TemplateId>, Error> {
        if self.ops.is_empty() {
            return Ok(Vec::new());
        }

        let pending = self.pending();
        if let Err(e) = hooks.run(self.store, &pending, ctx) {
            if let Error::Validation(v) = &e {
                warn!(
                    template = %v.template(),
                    key = v.message_key(),
                    "template save rejected"
                );
            }
            return Err(e);
        }

        let planned = self.plan()?;
        let (templates, template_links, category_links) = self.store.template_trees();

        let result: Result<(), TransactionError<Error>> =
            (templates, template_links, category_links).transaction(|(data, t_links, c_links)| {
                for write in &planned {
                    let id_key = encode_u64(write.id.0);
                    match &write.record {
                        Some(bytes) => {
                            data.insert(&id_key[..], bytes.as_slice())?;
                        }
                        None => {
                            data.remove(&id_key[..])?;
                        }
                    }

                    for category in &write.old_links {
                        t_links.remove(&LinkKey::new(write.id.0, category.0).encode()[..])?;
                        c_links.remove(&LinkKey::new(category.0, write.id.0).encode()[..])?;
                    }
                    for category in &write.new_links {
                        let forward = LinkKey::new(write.id.0, category.0).encode();
                        let backward = LinkKey::new(category.0, write.id.0).encode();
                        t_links.insert(&forward[..], Vec::<u8>::new())?;
                        c_links.insert(&backward[..], Vec::<u8>::new())?;
                    }
                }
                Ok(())
            });
        tx_result(result)?;

        let saved: Vec<TemplateId> = pending.iter().map(|t| t.id).collect();
        info!(
            saved = saved.len(),
            deleted = planned.len() - saved.len(),
            "committed template changes"
        );
        Ok(saved)
    }

    /// Resolve the staged state into concrete record and link changes.
    fn plan(&self) -> Result<Vec<PlannedWrite>, Error> {
        let mut planned = Vec::new();

        for id in self.touched() {
            let existing = self.store.template_record(id)?;
            let old_links = if existing.is_some() {
                self.store.template_categories(id)?
            } else {
                Vec::new()
            };

            let (record, new_links) = match self.write_cache.get(&id).cloned().flatten() {
                Some(template) => {
                    let record = TemplateRecord::from_template(
                        &template,
                        existing.as_ref().map(|r| r.created_at),
                    );
                    let links = template.categories.iter().copied().collect();
                    (Some(record.to_bytes()?), links)
                }
                None => (None, BTreeSet::new()),
            };

            planned.push(PlannedWrite {
                id,
                record,
                old_links,
                new_links,
            });
        }

        Ok(planned)
    }
}
