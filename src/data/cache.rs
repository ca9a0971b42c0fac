use std::cell::RefCell;
use std::rc::Rc;

use crate::data::loader::LoadError;
use crate::data::observation::Dataset;

type Loader = Box<dyn Fn() -> Result<Dataset, LoadError>>;

/// Memoized accessor for the read-only dataset.
///
/// The first `get` runs the loader; later calls hand out the same `Rc`
/// until `invalidate` is called. Failed loads are not memoized.
pub struct DatasetCache {
    loader: Loader,
    cached: RefCell<Option<Rc<Dataset>>>,
}

impl DatasetCache {
    pub fn new(loader: impl Fn() -> Result<Dataset, LoadError> + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            cached: RefCell::new(None),
        }
    }

    /// A cache that already holds `dataset` and reloads through `loader` after invalidation.
    pub fn preloaded(
        dataset: Rc<Dataset>,
        loader: impl Fn() -> Result<Dataset, LoadError> + 'static,
    ) -> Self {
        Self {
            loader: Box::new(loader),
            cached: RefCell::new(Some(dataset)),
        }
    }

    pub fn get(&self) -> Result<Rc<Dataset>, LoadError> {
        if let Some(dataset) = self.cached.borrow().as_ref() {
            return Ok(Rc::clone(dataset));
        }
        let dataset = Rc::new((self.loader)()?);
        *self.cached.borrow_mut() = Some(Rc::clone(&dataset));
        Ok(dataset)
    }

    #[cfg(test)]
    fn is_loaded(&self) -> bool {
        self.cached.borrow().is_some()
    }

    pub fn invalidate(&self) {
        self.cached.borrow_mut().take();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::data::observation::{Granularity, Observation, Period};

    fn counting_cache(fail: bool) -> (DatasetCache, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let cache = DatasetCache::new(move || {
            counter.set(counter.get() + 1);
            if fail {
                return Err(LoadError::NoObservations);
            }
            Ok(Dataset::new(
                vec![Observation::new("a", Period::Year(2020), 1.0, 100.0)],
                Granularity::Yearly,
            ))
        });
        (cache, calls)
    }

    #[test]
    fn test_loads_once_and_shares() {
        let (cache, calls) = counting_cache(false);
        assert!(!cache.is_loaded());
        let first = cache.get().unwrap();
        let second = cache.get().unwrap();
        assert_eq!(calls.get(), 1);
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let (cache, calls) = counting_cache(false);
        let first = cache.get().unwrap();
        cache.invalidate();
        assert!(!cache.is_loaded());
        let second = cache.get().unwrap();
        assert_eq!(calls.get(), 2);
        assert!(!Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_preloaded_skips_loader_until_invalidated() {
        let dataset = Rc::new(Dataset::new(Vec::new(), Granularity::Monthly));
        let cache = DatasetCache::preloaded(Rc::clone(&dataset), || Err(LoadError::NoObservations));
        assert!(Rc::ptr_eq(&cache.get().unwrap(), &dataset));
        cache.invalidate();
        assert!(matches!(cache.get(), Err(LoadError::NoObservations)));
    }

    #[test]
    fn test_errors_are_not_memoized() {
        let (cache, calls) = counting_cache(true);
        assert!(cache.get().is_err());
        assert!(cache.get().is_err());
        assert_eq!(calls.get(), 2);
        assert!(!cache.is_loaded());
    }
}
