use futures::stream::{self, StreamExt};
use std::fmt::Display;
use std::future::Future;
use std::time::Instant;

use super::elapsed_ms;
use crate::error::EngineResult;
use crate::models::EntityKind;
use crate::result::{DataResult, Event};

/// Runs one query per input and reassembles the envelopes in input order
///
/// Up to `concurrency` sub-queries are in flight at once. Each outcome is
/// written to the slot of its input index, so completion order never
/// shows through. A failed input yields an envelope holding an error
/// event; the other inputs are unaffected.
#[derive(Debug, Clone, Copy)]
pub struct BatchDispatcher {
    concurrency: usize,
}

impl BatchDispatcher {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub async fn run<I, T, F, Fut>(
        &self,
        entity: EntityKind,
        inputs: Vec<I>,
        mut op: F,
    ) -> Vec<DataResult<T>>
    where
        I: Display,
        F: FnMut(usize, I) -> Fut,
        Fut: Future<Output = EngineResult<DataResult<T>>>,
    {
        let mut slots: Vec<Option<DataResult<T>>> = inputs.iter().map(|_| None).collect();

        let pending = inputs.into_iter().enumerate().map(|(index, input)| {
            let id = input.to_string();
            let started = Instant::now();
            let query = op(index, input);
            async move { (index, id, started, query.await) }
        });
        let mut outcomes = stream::iter(pending).buffer_unordered(self.concurrency);

        while let Some((index, id, started, outcome)) = outcomes.next().await {
            let envelope = match outcome {
                Ok(result) => result.with_id(id),
                Err(err) => {
                    tracing::warn!(%entity, index, input = %id, error = %err, "Batch element failed");
                    DataResult::failed(id, Event::from_error(&err, entity, Some(index)))
                },
            };
            if let Some(slot) = slots.get_mut(index) {
                *slot = Some(envelope.with_time(elapsed_ms(started)));
            }
        }

        slots.into_iter().map(Option::unwrap_or_default).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::{BackendError, EngineError};
    use std::time::Duration;

    #[tokio::test]
    async fn test_order_survives_out_of_order_completion() {
        let dispatcher = BatchDispatcher::new(4);
        let results = dispatcher
            .run(EntityKind::Gene, vec![30u64, 10, 20, 0], |_, delay| async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                Ok::<_, EngineError>(DataResult::new(vec![delay]))
            })
            .await;
        let ids: Vec<_> = results.iter().map(|r| r.id().to_string()).collect();
        assert_eq!(ids, ["30", "10", "20", "0"]);
        assert_eq!(results[1].results(), [10]);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let results: Vec<DataResult<u8>> = BatchDispatcher::new(2)
            .run(EntityKind::Gene, Vec::<String>::new(), |_, _| async {
                Ok::<_, EngineError>(DataResult::empty())
            })
            .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_position() {
        let results = BatchDispatcher::new(2)
            .run(EntityKind::Variant, vec!["a", "b", "c", "d", "e"], |index, input| async move {
                if index == 2 {
                    Err(EngineError::from(BackendError::io("connection reset")))
                } else {
                    Ok(DataResult::new(vec![input.to_uppercase()]))
                }
            })
            .await;

        assert_eq!(results.len(), 5);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.has_errors(), i == 2);
        }
        let event = &results[2].events()[0];
        assert_eq!(event.index, Some(2));
        assert_eq!(results[2].id(), "c");
        assert_eq!(results[4].results(), ["E"]);
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        assert_eq!(BatchDispatcher::new(0).concurrency(), 1);
    }

    proptest::proptest! {
        #[test]
        fn prop_envelopes_follow_input_order(
            delays in proptest::collection::vec(0u64..4, 0..12),
            concurrency in 1usize..6,
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let results = runtime.block_on(BatchDispatcher::new(concurrency).run(
                EntityKind::Gene,
                delays.clone(),
                |index, delay| async move {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    Ok::<_, EngineError>(DataResult::new(vec![index]))
                },
            ));

            proptest::prop_assert_eq!(results.len(), delays.len());
            for (index, result) in results.iter().enumerate() {
                proptest::prop_assert_eq!(result.results(), &[index][..]);
                proptest::prop_assert_eq!(result.id(), delays[index].to_string());
            }
        }
    }
}
