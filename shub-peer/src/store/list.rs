use crate::store::StoreError;
use std::slice;

pub type ListListener<V> = Box<dyn FnMut(&ObservableList<V>, usize, &V)>;

/// Ordered collection that reports inserts, updates and deletes by index.
pub struct ObservableList<V> {
    items: Vec<V>,
    on_insert: Option<ListListener<V>>,
    on_update: Option<ListListener<V>>,
    on_delete: Option<ListListener<V>>,
}

impl<V> Default for ObservableList<V> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            on_insert: None,
            on_update: None,
            on_delete: None,
        }
    }
}

impl<V> ObservableList<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: usize) -> Option<&V> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, V> {
        self.items.iter()
    }

    /// Appends and returns the new index.
    pub fn push(&mut self, value: V) -> usize {
        let index = self.items.len();
        self.items.push(value);

        if let Some(mut listener) = self.on_insert.take() {
            listener(self, index, &self.items[index]);
            self.on_insert.get_or_insert(listener);
        }
        index
    }

    /// Writing one past the end appends.
    pub fn set(&mut self, index: usize, value: V) -> Result<(), StoreError> {
        let len = self.items.len();
        if index > len {
            return Err(StoreError::IndexOutOfBounds { index, len });
        }
        if index == len {
            self.push(value);
            return Ok(());
        }

        self.items[index] = value;

        if let Some(mut listener) = self.on_update.take() {
            listener(self, index, &self.items[index]);
            self.on_update.get_or_insert(listener);
        }
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<V, StoreError> {
        let len = self.items.len();
        if index >= len {
            return Err(StoreError::IndexOutOfBounds { index, len });
        }

        let removed = self.items.remove(index);
        if let Some(mut listener) = self.on_delete.take() {
            listener(self, index, &removed);
            self.on_delete.get_or_insert(listener);
        }
        Ok(removed)
    }

    pub fn on_insert<F>(&mut self, listener: F)
    where
        F: FnMut(&ObservableList<V>, usize, &V) + 'static,
    {
        self.on_insert = Some(Box::new(listener));
    }

    pub fn on_update<F>(&mut self, listener: F)
    where
        F: FnMut(&ObservableList<V>, usize, &V) + 'static,
    {
        self.on_update = Some(Box::new(listener));
    }

    pub fn on_delete<F>(&mut self, listener: F)
    where
        F: FnMut(&ObservableList<V>, usize, &V) + 'static,
    {
        self.on_delete = Some(Box::new(listener));
    }
}
