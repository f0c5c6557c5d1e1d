use std::collections::HashMap;
use std::convert::Infallible;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanOutFailure<E> {
    pub index: usize,
    pub error: E,
}

/// Index-aligned outcome of a fan-out: `results[i]` belongs to `inputs[i]` and
/// is `None` exactly when `failures` holds an entry for `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanOutReport<O, E> {
    pub results: Vec<Option<O>>,
    pub failures: Vec<FanOutFailure<E>>,
}

impl<O, E> FanOutReport<O, E> {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn successes(&self) -> impl Iterator<Item = (usize, &O)> {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(index, result)| result.as_ref().map(|value| (index, value)))
    }
}

/// Runs `mapper` over every input with at most `workers` threads. Workers pull
/// indexes from one shared cursor, so each input is mapped exactly once.
pub fn fan_out<I, O, E, F>(inputs: &[I], workers: usize, mapper: F) -> FanOutReport<O, E>
where
    I: Sync,
    O: Send,
    E: Send,
    F: Fn(usize, &I) -> Result<O, E> + Sync,
{
    if inputs.is_empty() {
        return FanOutReport {
            results: Vec::new(),
            failures: Vec::new(),
        };
    }

    let worker_count = workers.clamp(1, inputs.len());
    let cursor = AtomicUsize::new(0);
    let slots: Vec<Mutex<Option<Result<O, E>>>> =
        inputs.iter().map(|_| Mutex::new(None)).collect();

    thread::scope(|scope| {
        for _ in 0..worker_count {
            scope.spawn(|| loop {
                let index = cursor.fetch_add(1, Ordering::SeqCst);
                let Some(input) = inputs.get(index) else {
                    break;
                };
                let outcome = mapper(index, input);
                *slots[index].lock().unwrap_or_else(PoisonError::into_inner) = Some(outcome);
            });
        }
    });

    let mut results = Vec::with_capacity(inputs.len());
    let mut failures = Vec::new();
    for (index, slot) in slots.into_iter().enumerate() {
        match slot.into_inner().unwrap_or_else(PoisonError::into_inner) {
            Some(Ok(value)) => results.push(Some(value)),
            Some(Err(error)) => {
                results.push(None);
                failures.push(FanOutFailure { index, error });
            }
            None => results.push(None),
        }
    }

    FanOutReport { results, failures }
}

/// Memoizes one successful lookup per distinct key. Concurrent callers for the
/// same key block on the fetch in flight instead of issuing their own; a failed
/// fetch leaves the key empty so the next caller retries.
#[derive(Debug)]
pub struct KeyedCache<K, V> {
    cells: Mutex<HashMap<K, Arc<Mutex<Option<V>>>>>,
    fetches: AtomicUsize,
}

impl<K, V> Default for KeyedCache<K, V> {
    fn default() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
            fetches: AtomicUsize::new(0),
        }
    }
}

impl<K, V> KeyedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_fetch<F>(&self, key: &K, fetch: F) -> V
    where
        F: FnOnce() -> V,
    {
        match self.get_or_try_fetch(key, || Ok::<V, Infallible>(fetch())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Only `Ok` values are stored.
    pub fn get_or_try_fetch<E, F>(&self, key: &K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let cell = {
            let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(cells.entry(key.clone()).or_default())
        };
        let mut slot = cell.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = slot.as_ref() {
            return Ok(value.clone());
        }
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let value = fetch()?;
        *slot = Some(value.clone());
        Ok(value)
    }

    /// Number of fetches actually issued, failed ones included.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Keys holding a cached value.
    pub fn len(&self) -> usize {
        self.cells
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|cell| cell.lock().unwrap_or_else(PoisonError::into_inner).is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
