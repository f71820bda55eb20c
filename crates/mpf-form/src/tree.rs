//! Form tree orchestration
//!
//! [`FormTree`] owns the Group/Object collection and drives type resolution
//! per Object.
//!
//! # Resolution flow
//!
//! ```text
//! set_object_type ─┬─ Logical / Unresolved ──────────────→ rendered now
//!                  └─ SchemaBacked → Pending + ResolutionTicket
//!                                         │ ticket.resolve(&resolver).await
//!                                         ▼
//!                                    apply_resolution → Applied | Stale | Orphaned
//! ```
//!
//! Every `set_object_type` bumps the Object's generation. A resolution only
//! lands when its ticket's generation is still current, so the last issued
//! selection wins no matter in which order lookups complete.

use crate::allocator::{GroupSlot, IndexAllocator, ObjectPath, ObjectSlot};
use crate::error::{FormError, FormResult};
use crate::model::{GroupFields, ObjectFields, ObjectPayload};
use crate::shape::{ObjectShape, RenderedFields};
use crate::snapshot::{GroupSnapshot, ObjectSnapshot, ProjectSnapshot};
use futures::future::join_all;
use mpf_schema::{Classification, ResolvedShape, SchemaResolver, SchemaResult};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A live Object
#[derive(Debug, Clone)]
pub struct ObjectNode {
    fields: ObjectFields,
    object_type: Option<String>,
    classification: Classification,
    generation: u64,
    shape: ObjectShape,
}

impl ObjectNode {
    fn new() -> Self {
        Self {
            fields: ObjectFields::default(),
            object_type: None,
            classification: Classification::Unresolved,
            generation: 0,
            shape: ObjectShape::Unselected,
        }
    }

    /// Scalar fields
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &ObjectFields {
        &self.fields
    }

    /// Selected type token
    #[inline]
    #[must_use]
    pub fn object_type(&self) -> Option<&str> {
        self.object_type.as_deref()
    }

    /// Classification of the selected token
    #[inline]
    #[must_use]
    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    /// Resolution state
    #[inline]
    #[must_use]
    pub fn shape(&self) -> &ObjectShape {
        &self.shape
    }

    /// Generation of the latest type selection
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn to_snapshot(&self) -> ObjectSnapshot {
        let (identifiers, data) = self
            .shape
            .payload()
            .map(ObjectPayload::into_slots)
            .unwrap_or_default();
        ObjectSnapshot {
            fields: self.fields.clone(),
            object_type: self.object_type.clone(),
            legacy_type: None,
            identifiers,
            data,
        }
    }
}

/// A live Group
#[derive(Debug, Clone, Default)]
pub struct GroupNode {
    fields: GroupFields,
    objects: BTreeMap<ObjectSlot, ObjectNode>,
}

impl GroupNode {
    /// Scalar fields
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &GroupFields {
        &self.fields
    }

    /// Objects in slot (display) order
    pub fn objects(&self) -> impl Iterator<Item = (ObjectSlot, &ObjectNode)> {
        self.objects.iter().map(|(slot, node)| (*slot, node))
    }

    /// Number of live objects
    #[inline]
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

/// Pending registry lookup for one Object's type selection
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a ticket does nothing until resolved and applied"]
pub struct ResolutionTicket {
    path: ObjectPath,
    generation: u64,
    table: String,
    restore: bool,
}

impl ResolutionTicket {
    /// Object the ticket belongs to
    #[inline]
    pub fn path(&self) -> ObjectPath {
        self.path
    }

    /// Table to resolve
    #[inline]
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Generation the ticket was issued for
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Run the lookup; touches no tree state
    pub async fn resolve(self, resolver: &SchemaResolver) -> Resolution {
        let result = resolver.schema_backed_shape(&self.table).await;
        Resolution {
            ticket: self,
            result,
        }
    }

    /// Complete the ticket with an already known result
    pub fn complete(self, result: SchemaResult<ResolvedShape>) -> Resolution {
        Resolution {
            ticket: self,
            result,
        }
    }
}

/// Completed lookup, ready for [`FormTree::apply_resolution`]
#[derive(Debug, Clone)]
pub struct Resolution {
    ticket: ResolutionTicket,
    result: SchemaResult<ResolvedShape>,
}

impl Resolution {
    /// Originating ticket
    #[inline]
    pub fn ticket(&self) -> &ResolutionTicket {
        &self.ticket
    }

    /// Lookup outcome
    #[inline]
    pub fn result(&self) -> &SchemaResult<ResolvedShape> {
        &self.result
    }
}

/// What [`FormTree::apply_resolution`] did with a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The Object now shows the result (fields or inline error)
    Applied,
    /// A newer type selection superseded the ticket; dropped
    Stale,
    /// The Object no longer exists; dropped
    Orphaned,
}

/// Summary of a rehydration run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RehydrationReport {
    /// Groups recreated
    pub groups: usize,
    /// Objects recreated
    pub objects: usize,
    /// Objects whose type failed to resolve
    pub failed: Vec<ObjectPath>,
}

/// The Group/Object form
#[derive(Debug)]
pub struct FormTree {
    resolver: Arc<SchemaResolver>,
    allocator: IndexAllocator,
    groups: BTreeMap<GroupSlot, GroupNode>,
    next_generation: u64,
}

impl FormTree {
    /// Create empty tree resolving types through `resolver`
    #[must_use]
    pub fn new(resolver: Arc<SchemaResolver>) -> Self {
        Self {
            resolver,
            allocator: IndexAllocator::new(),
            groups: BTreeMap::new(),
            next_generation: 1,
        }
    }

    /// Shared resolver
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &Arc<SchemaResolver> {
        &self.resolver
    }

    /// Slot allocator (read-only)
    #[inline]
    #[must_use]
    pub fn allocator(&self) -> &IndexAllocator {
        &self.allocator
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Append an empty Group
    pub fn add_group(&mut self) -> GroupSlot {
        let slot = self.allocator.next_group_slot();
        self.groups.insert(slot, GroupNode::default());
        tracing::debug!(group = %slot, "group added");
        slot
    }

    /// Remove a Group and all its Objects
    ///
    /// # Errors
    /// `FormError::UnknownGroup` if `slot` is not live
    pub fn remove_group(&mut self, slot: GroupSlot) -> FormResult<()> {
        let node = self.groups.remove(&slot).ok_or(FormError::UnknownGroup(slot))?;
        self.allocator.release_group(slot);
        tracing::debug!(group = %slot, objects = node.objects.len(), "group removed");
        Ok(())
    }

    /// Append an empty Object to a Group
    ///
    /// # Errors
    /// `FormError::UnknownGroup` if `group` is not live
    pub fn add_object(&mut self, group: GroupSlot) -> FormResult<ObjectPath> {
        let node = self.groups.get_mut(&group).ok_or(FormError::UnknownGroup(group))?;
        let slot = self.allocator.next_object_slot(group)?;
        node.objects.insert(slot, ObjectNode::new());

        let path = ObjectPath::new(group, slot);
        tracing::debug!(object = %path, "object added");
        Ok(path)
    }

    /// Remove an Object; any lookup in flight for it becomes orphaned
    ///
    /// # Errors
    /// `FormError::UnknownObject` if `path` is not live
    pub fn remove_object(&mut self, path: ObjectPath) -> FormResult<()> {
        self.groups
            .get_mut(&path.group)
            .and_then(|g| g.objects.remove(&path.object))
            .ok_or(FormError::UnknownObject(path))?;
        tracing::debug!(object = %path, "object removed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Scalars
    // ------------------------------------------------------------------

    /// Replace a Group's scalar fields
    ///
    /// # Errors
    /// `FormError::UnknownGroup` if `slot` is not live
    pub fn update_group(&mut self, slot: GroupSlot, fields: GroupFields) -> FormResult<()> {
        self.groups
            .get_mut(&slot)
            .ok_or(FormError::UnknownGroup(slot))?
            .fields = fields;
        Ok(())
    }

    /// Replace an Object's scalar fields
    ///
    /// # Errors
    /// `FormError::UnknownObject` if `path` is not live
    pub fn update_object(&mut self, path: ObjectPath, fields: ObjectFields) -> FormResult<()> {
        self.object_mut(path)?.fields = fields;
        Ok(())
    }

    /// Write a rendered identifier or data field
    ///
    /// # Errors
    /// - `FormError::UnknownObject` if `path` is not live
    /// - `FormError::FieldNotRendered` if the Object is not ready or has no such field
    pub fn set_field_value(
        &mut self,
        path: ObjectPath,
        name: &str,
        value: impl Into<Value>,
    ) -> FormResult<()> {
        match &mut self.object_mut(path)?.shape {
            ObjectShape::Ready(rendered) => rendered.set(path, name, value.into()),
            _ => Err(FormError::FieldNotRendered {
                path,
                field: name.to_string(),
            }),
        }
    }

    // ------------------------------------------------------------------
    // Type selection
    // ------------------------------------------------------------------

    /// Select an Object's type
    ///
    /// Previously rendered fields and retained values are discarded. Logical
    /// kinds render immediately with layout defaults; registry tables go
    /// `Pending` and the returned ticket must be resolved and applied.
    ///
    /// # Errors
    /// `FormError::UnknownObject` if `path` is not live
    pub fn set_object_type(
        &mut self,
        path: ObjectPath,
        token: &str,
    ) -> FormResult<Option<ResolutionTicket>> {
        self.begin_resolution(path, token, None)
    }

    /// Select a type and wait for its fields
    ///
    /// # Errors
    /// `FormError::UnknownObject` if `path` is not live
    pub async fn select_object_type(&mut self, path: ObjectPath, token: &str) -> FormResult<ApplyOutcome> {
        match self.set_object_type(path, token)? {
            Some(ticket) => {
                let resolver = Arc::clone(&self.resolver);
                let resolution = ticket.resolve(&resolver).await;
                Ok(self.apply_resolution(resolution))
            }
            None => Ok(ApplyOutcome::Applied),
        }
    }

    fn begin_resolution(
        &mut self,
        path: ObjectPath,
        token: &str,
        restore: Option<Option<ObjectPayload>>,
    ) -> FormResult<Option<ResolutionTicket>> {
        let generation = self.next_generation;
        let classification = self.resolver.classify(token);
        let logical = match &classification {
            Classification::Logical(kind) => self.resolver.logical_shape(kind),
            _ => None,
        };

        self.next_generation += 1;
        let node = self.object_mut(path)?;
        node.generation = generation;
        node.object_type = Some(token.trim().to_string()).filter(|t| !t.is_empty());
        node.classification = classification.clone();

        let restoring = restore.is_some();
        let retained = restore.flatten();

        let ticket = match classification {
            Classification::Unresolved => {
                if let Some(payload) = &retained {
                    tracing::debug!(object = %path, keys = payload.values().len(), "stored values dropped, no type");
                }
                node.shape = ObjectShape::Unselected;
                None
            }
            Classification::Logical(_) => {
                node.shape = match logical {
                    Some(shape) => ObjectShape::Ready(render(path, shape, restoring, retained.as_ref())),
                    None => ObjectShape::Unselected,
                };
                None
            }
            Classification::SchemaBacked(table) => {
                node.shape = ObjectShape::Pending {
                    table: table.clone(),
                    retained,
                };
                Some(ResolutionTicket {
                    path,
                    generation,
                    table,
                    restore: restoring,
                })
            }
        };

        tracing::debug!(object = %path, token, generation, pending = ticket.is_some(), "object type set");
        Ok(ticket)
    }

    /// Land a completed lookup
    ///
    /// Results for removed Objects or superseded selections are dropped.
    pub fn apply_resolution(&mut self, resolution: Resolution) -> ApplyOutcome {
        let Resolution { ticket, result } = resolution;
        let path = ticket.path;

        let Some(node) = self
            .groups
            .get_mut(&path.group)
            .and_then(|g| g.objects.get_mut(&path.object))
        else {
            tracing::debug!(object = %path, table = %ticket.table, "resolution for removed object dropped");
            return ApplyOutcome::Orphaned;
        };

        if node.generation != ticket.generation {
            tracing::debug!(
                object = %path,
                table = %ticket.table,
                ticket = ticket.generation,
                current = node.generation,
                "stale resolution dropped"
            );
            return ApplyOutcome::Stale;
        }

        let retained = match std::mem::replace(&mut node.shape, ObjectShape::Unselected) {
            ObjectShape::Pending { retained, .. } => retained,
            _ => None,
        };

        node.shape = match result {
            Ok(shape) => ObjectShape::Ready(render(path, shape, ticket.restore, retained.as_ref())),
            Err(error) => {
                tracing::warn!(object = %path, table = %ticket.table, error = %error, "object type did not resolve");
                ObjectShape::Failed { error, retained }
            }
        };
        ApplyOutcome::Applied
    }

    /// Re-issue the lookup for a failed Object, keeping its stored values
    ///
    /// Returns `None` when the Object is not in the failed state.
    ///
    /// # Errors
    /// `FormError::UnknownObject` if `path` is not live
    pub fn retry_resolution(&mut self, path: ObjectPath) -> FormResult<Option<ResolutionTicket>> {
        let node = self.object_mut(path)?;
        let ObjectShape::Failed { retained, .. } = &mut node.shape else {
            return Ok(None);
        };
        let retained = retained.take();
        let token = node.object_type.clone().unwrap_or_default();

        tracing::info!(object = %path, token = %token, "retrying object type resolution");
        self.begin_resolution(path, &token, retained.map(Some))
    }

    // ------------------------------------------------------------------
    // Snapshot
    // ------------------------------------------------------------------

    /// Current tree as a snapshot
    ///
    /// Only filled-in values are written; failed or pending Objects write
    /// the values they retain.
    #[must_use]
    pub fn serialize(&self) -> ProjectSnapshot {
        ProjectSnapshot {
            groups: self
                .groups
                .values()
                .map(|group| GroupSnapshot {
                    fields: group.fields.clone(),
                    objects: group.objects.values().map(ObjectNode::to_snapshot).collect(),
                })
                .collect(),
        }
    }

    /// Rebuild the whole tree from a snapshot
    ///
    /// Slots are replayed from zero. Registry lookups for all schema-backed
    /// Objects run concurrently and are applied in document order; a failed
    /// lookup leaves that Object in the failed state and the run continues.
    ///
    /// # Errors
    /// Only on internal slot inconsistencies; schema failures are recorded in
    /// the report instead
    pub async fn rehydrate(&mut self, snapshot: ProjectSnapshot) -> FormResult<RehydrationReport> {
        self.clear();

        let mut report = RehydrationReport::default();
        let mut tickets = Vec::new();

        for group in snapshot.groups {
            let slot = self.add_group();
            self.update_group(slot, group.fields)?;
            report.groups += 1;

            for object in group.objects {
                let path = self.add_object(slot)?;
                report.objects += 1;

                let token = object.effective_type().unwrap_or_default().to_string();
                let payload = object.payload();
                self.update_object(path, object.fields)?;

                if let Some(ticket) = self.begin_resolution(path, &token, Some(payload))? {
                    tickets.push(ticket);
                }
            }
        }

        let resolver = Arc::clone(&self.resolver);
        let resolutions = join_all(tickets.into_iter().map(|t| t.resolve(&resolver))).await;

        for resolution in resolutions {
            let path = resolution.ticket().path();
            self.apply_resolution(resolution);
            if matches!(self.object(path)?.shape, ObjectShape::Failed { .. }) {
                report.failed.push(path);
            }
        }

        tracing::info!(
            groups = report.groups,
            objects = report.objects,
            failed = report.failed.len(),
            "form rehydrated"
        );
        Ok(report)
    }

    /// Page-load entry point: rehydrate from embedded JSON, if any
    ///
    /// A missing or undecodable document leaves the tree empty; it never fails.
    pub async fn bootstrap(&mut self, raw: Option<&str>) -> RehydrationReport {
        let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
            self.clear();
            return RehydrationReport::default();
        };

        match ProjectSnapshot::from_json(raw) {
            Ok(snapshot) => match self.rehydrate(snapshot).await {
                Ok(report) => report,
                Err(e) => {
                    tracing::warn!(error = %e, "rehydration aborted, starting empty");
                    self.clear();
                    RehydrationReport::default()
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "initial snapshot unreadable, starting empty");
                self.clear();
                RehydrationReport::default()
            }
        }
    }

    fn clear(&mut self) {
        self.groups.clear();
        self.allocator.reset();
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Group by slot
    ///
    /// # Errors
    /// `FormError::UnknownGroup` if `slot` is not live
    pub fn group(&self, slot: GroupSlot) -> FormResult<&GroupNode> {
        self.groups.get(&slot).ok_or(FormError::UnknownGroup(slot))
    }

    /// Object by path
    ///
    /// # Errors
    /// `FormError::UnknownObject` if `path` is not live
    pub fn object(&self, path: ObjectPath) -> FormResult<&ObjectNode> {
        self.groups
            .get(&path.group)
            .and_then(|g| g.objects.get(&path.object))
            .ok_or(FormError::UnknownObject(path))
    }

    fn object_mut(&mut self, path: ObjectPath) -> FormResult<&mut ObjectNode> {
        self.groups
            .get_mut(&path.group)
            .and_then(|g| g.objects.get_mut(&path.object))
            .ok_or(FormError::UnknownObject(path))
    }

    /// Groups in slot (display) order
    pub fn groups(&self) -> impl Iterator<Item = (GroupSlot, &GroupNode)> {
        self.groups.iter().map(|(slot, node)| (*slot, node))
    }

    /// Every live Object path in display order
    #[must_use]
    pub fn object_paths(&self) -> Vec<ObjectPath> {
        self.groups
            .iter()
            .flat_map(|(g, node)| node.objects.keys().map(move |o| ObjectPath::new(*g, *o)))
            .collect()
    }

    /// Number of live groups
    #[inline]
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of live objects
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.groups.values().map(GroupNode::object_count).sum()
    }
}

fn render(path: ObjectPath, shape: ResolvedShape, restoring: bool, retained: Option<&ObjectPayload>) -> RenderedFields {
    if !restoring {
        return RenderedFields::with_defaults(shape);
    }

    let mut rendered = RenderedFields::blank(shape);
    if let Some(payload) = retained {
        let dropped = rendered.overlay(payload);
        if !dropped.is_empty() {
            tracing::debug!(object = %path, ?dropped, "stored keys without a matching field dropped");
        }
    }
    rendered
}
