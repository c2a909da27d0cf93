//! Want/have reconciliation.
//!
//! The [`Reconciler`] walks a want record and a have record along a
//! declarative [`Layout`] and accumulates the commands that turn have into
//! want for the declared [`ResourceState`]. Every field is handled by one
//! of a few strategies:
//!
//! - [`Field::Scalar`]: generic compare. A differing want value is rendered;
//!   a value present only in have is rendered negated. Booleans render the
//!   negated form for `false` and the plain form for `true`.
//! - [`Field::Toggle`]: a boolean with a device default. A missing have
//!   value counts as the default, and dropping the field from want restores
//!   the default rather than negating the configured value.
//! - [`Field::Group`]: recurse into a nested record.
//! - [`Field::List`]: diff a list of objects by natural key.
//!
//! Under `merged` the want record is first overlaid on have along the same
//! layout, so whole list entries are replaced by key instead of merged leaf
//! by leaf.

use serde_json::{Map, Value};
use tracing::debug;

use super::parser::NetworkTemplate;
use super::renderer::Prefix;
use super::state::ResourceState;
use super::utils::{dict_merge, get_from_dict, is_empty, list_to_dict};
use super::TemplateError;

static NULL: Value = Value::Null;

/// Strategy for one field of a record
#[derive(Debug, Clone)]
pub enum Field {
    /// Generic compare through the named parser
    Scalar(&'static str),
    /// Boolean whose absence on the device means `default`
    Toggle { parser: &'static str, default: bool },
    /// Nested record under `name`
    Group {
        name: &'static str,
        fields: Vec<Field>,
    },
    /// List of objects under `name`, keyed by `key`
    List {
        name: &'static str,
        key: &'static str,
        entry: Entry,
    },
}

/// How entries of a [`Field::List`] are compared
#[derive(Debug, Clone)]
pub enum Entry {
    /// The entry is one command line; a modified entry is removed then re-added
    Whole(&'static str),
    /// The entry is a sub-object compared field by field
    Fields {
        header: Option<&'static str>,
        fields: Vec<Field>,
    },
}

/// Shape of a resource
#[derive(Debug, Clone)]
pub enum Layout {
    /// One record per device
    Single { fields: Vec<Field> },
    /// A list of records identified by `key`
    Keyed {
        key: &'static str,
        /// Parser rendering the line that opens an object's context
        header: &'static str,
        /// Parser whose negation removes a whole object
        purge: Option<&'static str>,
        /// Use `purge` for `deleted` too, not only for `purged`/`overridden`
        delete_whole: bool,
        /// Header fields that cannot change in place; a declared change
        /// removes the object and creates it again
        identity: &'static [&'static str],
        fields: Vec<Field>,
    },
}

impl Layout {
    /// Natural key for keyed layouts
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Layout::Single { .. } => None,
            Layout::Keyed { key, .. } => Some(*key),
        }
    }

    pub fn fields(&self) -> &[Field] {
        match self {
            Layout::Single { fields } | Layout::Keyed { fields, .. } => fields,
        }
    }
}

/// Accumulates the commands for one reconciliation run.
#[derive(Debug)]
pub struct Reconciler<'t> {
    template: &'t NetworkTemplate,
    prefix: Prefix,
    state: ResourceState,
    commands: Vec<String>,
}

impl<'t> Reconciler<'t> {
    pub fn new(template: &'t NetworkTemplate, state: ResourceState) -> Self {
        Self {
            template,
            prefix: template.prefix().clone(),
            state,
            commands: Vec::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn state(&self) -> ResourceState {
        self.state
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<String> {
        self.commands
    }

    /// Render `parser` against `data` and append the result.
    pub fn addcmd(&mut self, data: &Value, parser: &str, negate: bool) -> Result<(), TemplateError> {
        if let Some(rendered) = self
            .template
            .render_with_prefix(data, parser, negate, &self.prefix)?
        {
            self.commands.extend(rendered.into_lines());
        }
        Ok(())
    }

    /// Render `parser` and insert its lines at `index`.
    fn insert_at(
        &mut self,
        index: usize,
        data: &Value,
        parser: &str,
        negate: bool,
    ) -> Result<(), TemplateError> {
        if let Some(rendered) = self
            .template
            .render_with_prefix(data, parser, negate, &self.prefix)?
        {
            let tail = self.commands.split_off(index);
            self.commands.extend(rendered.into_lines());
            self.commands.extend(tail);
        }
        Ok(())
    }

    /// Whether a whole entry renders to the same lines on both sides.
    fn same_entry(&self, parser: &str, want: &Value, have: &Value) -> Result<bool, TemplateError> {
        if have.is_null() {
            return Ok(false);
        }
        if want == have {
            return Ok(true);
        }
        let lines = |data: &Value| -> Result<Option<Vec<String>>, TemplateError> {
            Ok(self
                .template
                .render_with_prefix(data, parser, false, &self.prefix)?
                .map(|rendered| rendered.into_lines()))
        };
        Ok(lines(want)? == lines(have)?)
    }

    /// Generic per-field compare for each parser in order.
    pub fn compare(&mut self, parsers: &[&str], want: &Value, have: &Value) -> Result<(), TemplateError> {
        for name in parsers {
            let path = self.template.get_parser(name)?.compval().to_string();
            let wanted = get_from_dict(want, &path);
            let had = get_from_dict(have, &path);

            match (wanted, had) {
                (Some(w), h) if Some(w) != h => {
                    debug!(parser = %name, want = %w, have = ?h, "field differs");
                    match w {
                        Value::Bool(enabled) => self.addcmd(want, name, !enabled)?,
                        _ => self.addcmd(want, name, false)?,
                    }
                }
                (None, Some(h)) => {
                    debug!(parser = %name, have = %h, "field removed");
                    match h {
                        Value::Bool(enabled) => self.addcmd(have, name, *enabled)?,
                        _ => self.addcmd(have, name, true)?,
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn compare_toggle(
        &mut self,
        parser: &str,
        default: bool,
        want: &Value,
        have: &Value,
    ) -> Result<(), TemplateError> {
        let path = self.template.get_parser(parser)?.compval().to_string();
        let wanted = get_from_dict(want, &path).and_then(Value::as_bool);
        let had = get_from_dict(have, &path).and_then(Value::as_bool);

        // Offline rendering has no device to supply the default
        let effective_have = match self.state {
            ResourceState::Rendered => had,
            _ => Some(had.unwrap_or(default)),
        };

        match (wanted, had) {
            (Some(w), _) if Some(w) != effective_have => {
                debug!(parser = %parser, want = w, have = ?effective_have, "toggle differs");
                self.addcmd(want, parser, !w)
            }
            (None, Some(h)) if h != default => {
                debug!(parser = %parser, have = h, "toggle restored to default");
                self.addcmd(have, parser, !default)
            }
            _ => Ok(()),
        }
    }

    /// Dispatch each field to its strategy, in declared order.
    pub fn compare_fields(&mut self, fields: &[Field], want: &Value, have: &Value) -> Result<(), TemplateError> {
        for field in fields {
            match field {
                Field::Scalar(parser) => self.compare(&[*parser], want, have)?,
                Field::Toggle { parser, default } => {
                    self.compare_toggle(parser, *default, want, have)?
                }
                Field::Group { name, fields } => {
                    let w = want.get(*name).unwrap_or(&NULL);
                    let h = have.get(*name).unwrap_or(&NULL);
                    self.compare_fields(fields, w, h)?;
                }
                Field::List { name, key, entry } => {
                    let w = want.get(*name).unwrap_or(&NULL);
                    let h = have.get(*name).unwrap_or(&NULL);
                    self.compare_list(key, entry, w, h)?;
                }
            }
        }
        Ok(())
    }

    fn compare_list(&mut self, key: &str, entry: &Entry, want: &Value, have: &Value) -> Result<(), TemplateError> {
        let wantd = as_keyed(want, key);
        let haved = as_keyed(have, key);

        let unmatched: Vec<&Value> = haved
            .iter()
            .filter(|(k, _)| !wantd.contains_key(k.as_str()))
            .map(|(_, v)| v)
            .collect();

        if self.state.prunes() {
            for h in unmatched {
                match entry {
                    Entry::Whole(parser) => self.addcmd(h, parser, true)?,
                    Entry::Fields { header, fields } => self.compare_object(*header, fields, &NULL, h)?,
                }
            }
        }

        for (k, w) in &wantd {
            let h = haved.get(k).unwrap_or(&NULL);
            match entry {
                Entry::Whole(parser) => {
                    if !self.same_entry(parser, w, h)? {
                        if !h.is_null() {
                            self.addcmd(h, parser, true)?;
                        }
                        self.addcmd(w, parser, false)?;
                    }
                }
                Entry::Fields { header, fields } => self.compare_object(*header, fields, w, h)?,
            }
        }
        Ok(())
    }

    /// Compare `fields` and open the body with `header` iff it produced commands.
    ///
    /// The header renders from want overlaid on have, so identity fields
    /// omitted from want keep their device value.
    pub fn compare_object(
        &mut self,
        header: Option<&str>,
        fields: &[Field],
        want: &Value,
        have: &Value,
    ) -> Result<(), TemplateError> {
        let start = self.commands.len();
        self.compare_fields(fields, want, have)?;

        if let Some(header) = header {
            if self.commands.len() > start {
                let source = dict_merge(have, want);
                self.insert_at(start, &source, header, false)?;
            }
        }
        Ok(())
    }

    /// Run the state machine over a whole resource and return the commands.
    ///
    /// Keyed layouts expect `want` and `have` as maps from natural key to
    /// object.
    pub fn reconcile(mut self, layout: &Layout, want: &Value, have: &Value) -> Result<Vec<String>, TemplateError> {
        debug!(state = %self.state, "reconciling");
        match layout {
            Layout::Single { fields } => {
                let want = match self.state {
                    ResourceState::Merged => merge_record(fields, have, want),
                    ResourceState::Deleted | ResourceState::Purged => Value::Object(Map::new()),
                    _ => want.clone(),
                };
                self.compare_fields(fields, &want, have)?;
            }
            Layout::Keyed {
                key,
                header,
                purge,
                delete_whole,
                identity,
                fields,
            } => {
                let mut wantd = as_keyed(want, key);
                let mut haved = as_keyed(have, key);

                match self.state {
                    ResourceState::Merged => {
                        wantd = merge_keyed(
                            key,
                            Some(fields),
                            &Value::Object(haved.clone()),
                            &Value::Object(wantd),
                        );
                    }
                    ResourceState::Deleted | ResourceState::Purged => {
                        if !wantd.is_empty() {
                            haved = haved
                                .into_iter()
                                .filter(|(k, _)| wantd.contains_key(k.as_str()))
                                .collect();
                        }
                        wantd = Map::new();
                    }
                    _ => {}
                }

                if matches!(
                    self.state,
                    ResourceState::Overridden | ResourceState::Deleted | ResourceState::Purged
                ) {
                    let whole = match self.state {
                        ResourceState::Deleted => *delete_whole,
                        _ => true,
                    };
                    for (k, h) in haved.iter().filter(|(k, _)| !wantd.contains_key(k.as_str())) {
                        match purge {
                            Some(purge) if whole => {
                                debug!(key = %k, "removing object");
                                self.addcmd(h, purge, true)?;
                            }
                            _ => {
                                debug!(key = %k, "clearing object");
                                self.compare_object(Some(*header), fields, &NULL, h)?;
                            }
                        }
                    }
                }

                for (k, w) in &wantd {
                    let mut h = haved.get(k).unwrap_or(&NULL);
                    if !h.is_null() && identity_changed(identity, w, h) {
                        debug!(key = %k, "identity changed, recreating object");
                        match purge {
                            Some(purge) => self.addcmd(h, purge, true)?,
                            None => self.compare_object(Some(*header), fields, &NULL, h)?,
                        }
                        h = &NULL;
                    }
                    let start = self.commands.len();
                    self.compare_object(Some(*header), fields, w, h)?;

                    // A new object with nothing else to set still needs its header
                    if self.commands.len() == start && h.is_null() && !is_empty(w) {
                        debug!(key = %k, "creating object");
                        self.addcmd(w, header, false)?;
                    }
                }
            }
        }
        Ok(self.commands)
    }
}

/// Whether want declares an identity field with a value other than have's.
fn identity_changed(identity: &[&str], want: &Value, have: &Value) -> bool {
    identity.iter().any(|field| match get_from_dict(want, field) {
        Some(w) => get_from_dict(have, field) != Some(w),
        None => false,
    })
}

/// Overlay `want` on `have` along `fields`.
///
/// Records merge key by key. List entries merge by natural key; a
/// [`Entry::Whole`] entry from want replaces the have entry outright.
pub(crate) fn merge_record(fields: &[Field], have: &Value, want: &Value) -> Value {
    let mut merged = dict_merge(have, want);
    if let Value::Object(map) = &mut merged {
        for field in fields {
            match field {
                Field::Group { name, fields } => {
                    if let (Some(h), Some(w)) = (have.get(*name), want.get(*name)) {
                        map.insert(name.to_string(), merge_record(fields, h, w));
                    }
                }
                Field::List { name, key, entry } => {
                    let w = want.get(*name).unwrap_or(&NULL);
                    if w.is_null() {
                        continue;
                    }
                    let h = have.get(*name).unwrap_or(&NULL);
                    let entry_fields = match entry {
                        Entry::Whole(_) => None,
                        Entry::Fields { fields, .. } => Some(fields.as_slice()),
                    };
                    map.insert(
                        name.to_string(),
                        Value::Object(merge_keyed(key, entry_fields, h, w)),
                    );
                }
                Field::Scalar(_) | Field::Toggle { .. } => {}
            }
        }
    }
    merged
}

/// Merge two keyed collections; `fields` is `None` for whole entries.
fn merge_keyed(key: &str, fields: Option<&[Field]>, have: &Value, want: &Value) -> Map<String, Value> {
    let mut merged = as_keyed(have, key);
    for (k, w) in as_keyed(want, key) {
        let entry = match fields {
            Some(fields) => merge_record(fields, merged.get(&k).unwrap_or(&NULL), &w),
            None => w,
        };
        merged.insert(k, entry);
    }
    merged
}

/// Keyed map view of a list of objects or an already keyed map.
pub(crate) fn as_keyed(value: &Value, key: &str) -> Map<String, Value> {
    match value {
        Value::Object(map) => map.clone(),
        Value::Array(items) => list_to_dict(items, key).0,
        _ => Map::new(),
    }
}
