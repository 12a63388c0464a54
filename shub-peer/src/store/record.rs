use crate::store::StoreError;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

pub type RecordListener<V> = Box<dyn FnMut(&Record<V>, &str, &V)>;

/// Container whose field set is fixed when it is built.
///
/// Reading, writing or watching a field that was not declared fails with
/// [`StoreError::SchemaViolation`].
pub struct Record<V> {
    fields: BTreeMap<&'static str, V>,
    listeners: HashMap<&'static str, RecordListener<V>>,
}

impl<V> Record<V> {
    pub fn new(fields: impl IntoIterator<Item = (&'static str, V)>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
            listeners: HashMap::new(),
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }

    pub fn get(&self, field: &str) -> Result<&V, StoreError> {
        self.fields
            .get(field)
            .ok_or_else(|| StoreError::SchemaViolation(field.to_owned()))
    }

    /// Stores `value` and then runs the field's listener, if any.
    pub fn set(&mut self, field: &str, value: V) -> Result<(), StoreError> {
        let key = self.declared(field)?;
        self.fields.insert(key, value);

        if let Some(mut listener) = self.listeners.remove(key) {
            if let Some(value) = self.fields.get(key) {
                listener(self, key, value);
            }
            self.listeners.entry(key).or_insert(listener);
        }
        Ok(())
    }

    pub fn on_set<F>(&mut self, field: &str, listener: F) -> Result<(), StoreError>
    where
        F: FnMut(&Record<V>, &str, &V) + 'static,
    {
        let key = self.declared(field)?;
        self.listeners.insert(key, Box::new(listener));
        Ok(())
    }

    pub fn remove_listener(&mut self, field: &str) {
        self.listeners.remove(field);
    }

    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    fn declared(&self, field: &str) -> Result<&'static str, StoreError> {
        self.fields
            .get_key_value(field)
            .map(|(key, _)| *key)
            .ok_or_else(|| StoreError::SchemaViolation(field.to_owned()))
    }
}

impl<V: fmt::Debug> fmt::Debug for Record<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("fields", &self.fields)
            .field("listeners", &self.listeners.keys().collect::<Vec<_>>())
            .finish()
    }
}
