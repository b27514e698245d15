// -------------------------------------------------------------------
// Versioned
// -------------------------------------------------------------------

/// A value with a change counter. Every mutable access bumps the
/// version, which downstream caches use as their invalidation key.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    version: u64,
    data: T,
}

impl<T> Versioned<T> {
    pub fn new(data: T) -> Self {
        Self { version: 0, data }
    }

    pub fn get(&self) -> &T {
        &self.data
    }

    pub fn set(&mut self, data: T) {
        self.data = data;
        self.version = self.version.wrapping_add(1);
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

impl<T: Default> Default for Versioned<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

// -------------------------------------------------------------------
// Memoized
// -------------------------------------------------------------------

/// Derived data recomputed only when its key changes. Keys are built
/// from `Versioned` counters so a frame that touches nothing reuses
/// the previous result.
pub struct Memoized<S, K, V> {
    last_key: Option<K>,
    last_value: Option<V>,
    get_key: Box<dyn Fn(&S) -> K>,
    calc: Box<dyn Fn(&S) -> V>,
}

impl<S, K, V> Memoized<S, K, V>
where
    K: PartialEq,
{
    pub fn new(
        get_key: impl Fn(&S) -> K + 'static,
        calc: impl Fn(&S) -> V + 'static,
    ) -> Self {
        Self {
            last_key: None,
            last_value: None,
            get_key: Box::new(get_key),
            calc: Box::new(calc),
        }
    }

    /// Recompute only if the key changed; return the cached value.
    pub fn get<'a>(&'a mut self, store: &S) -> &'a V {
        let key = (self.get_key)(store);
        let stale = match &self.last_key {
            Some(k) => *k != key,
            None => true,
        };
        if stale {
            self.last_value = Some((self.calc)(store));
            self.last_key = Some(key);
        }
        self.last_value.as_ref().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn versioned_bumps_on_set() {
        let mut v = Versioned::new(1);
        assert_eq!(v.version(), 0);
        v.set(2);
        assert_eq!(v.version(), 1);
        assert_eq!(*v.get(), 2);
    }

    #[test]
    fn memoized_recomputes_only_on_key_change() {
        let calls = Rc::new(Cell::new(0u32));
        let counter = calls.clone();
        let mut memo: Memoized<Versioned<i32>, u64, i32> =
            Memoized::new(
                |s: &Versioned<i32>| s.version(),
                move |s| {
                    counter.set(counter.get() + 1);
                    *s.get() * 10
                },
            );

        let mut store = Versioned::new(3);
        assert_eq!(*memo.get(&store), 30);
        assert_eq!(*memo.get(&store), 30);
        assert_eq!(calls.get(), 1);

        store.set(4);
        assert_eq!(*memo.get(&store), 40);
        assert_eq!(calls.get(), 2);
    }
}
