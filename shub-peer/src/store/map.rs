use std::collections::BTreeMap;
use std::collections::btree_map;

pub type MapListener<V> = Box<dyn FnMut(&ObservableMap<V>, &str, &V)>;

/// `clear` and changes made through [`ObservableMap::get_mut`] are not
/// observed.
pub struct ObservableMap<V> {
    entries: BTreeMap<String, V>,
    on_set: Option<MapListener<V>>,
    on_delete: Option<MapListener<V>>,
}

impl<V> Default for ObservableMap<V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            on_set: None,
            on_delete: None,
        }
    }
}

impl<V> ObservableMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, V> {
        self.entries.iter()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        let previous = self.entries.insert(key.clone(), value);

        if let Some(mut listener) = self.on_set.take() {
            if let Some(value) = self.entries.get(&key) {
                listener(self, &key, value);
            }
            self.on_set.get_or_insert(listener);
        }
        previous
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        let removed = self.entries.remove(key)?;

        if let Some(mut listener) = self.on_delete.take() {
            listener(self, key, &removed);
            self.on_delete.get_or_insert(listener);
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn on_set<F>(&mut self, listener: F)
    where
        F: FnMut(&ObservableMap<V>, &str, &V) + 'static,
    {
        self.on_set = Some(Box::new(listener));
    }

    pub fn on_delete<F>(&mut self, listener: F)
    where
        F: FnMut(&ObservableMap<V>, &str, &V) + 'static,
    {
        self.on_delete = Some(Box::new(listener));
    }
}
