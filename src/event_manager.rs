use std::cmp::Ordering;
use std::collections::BinaryHeap;

use chrono::{DateTime, Utc};

use crate::event::Event;

#[derive(Debug)]
struct QueuedEvent {
    datetime: DateTime<Utc>,
    seq: u64,
    event: Event,
}

impl PartialEq for QueuedEvent {
    fn eq(&self, other: &Self) -> bool {
        self.datetime == other.datetime && self.seq == other.seq
    }
}

impl Eq for QueuedEvent {}

impl Ord for QueuedEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for Min-Heap behavior in BinaryHeap;
        // seq breaks ties so equal datetimes pop in insertion order
        other
            .datetime
            .cmp(&self.datetime)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueuedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// 事件队列
///
/// 按事件时间戳排序分发; 相同时间戳按入队顺序分发。
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<QueuedEvent>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        EventQueue {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// 入队
    pub fn push(&mut self, event: impl Into<Event>) {
        let event = event.into();
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(QueuedEvent {
            datetime: event.datetime(),
            seq,
            event,
        });
    }

    /// 按时间顺序出队
    pub fn pop(&mut self) -> Option<Event> {
        self.heap.pop().map(|queued| queued.event)
    }

    /// 下一个事件的时间戳
    pub fn peek_datetime(&self) -> Option<DateTime<Utc>> {
        self.heap.peek().map(|queued| queued.datetime)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::IndicatorEvent;
    use chrono::TimeZone;

    fn indicator(name: &str, datetime: DateTime<Utc>) -> IndicatorEvent {
        IndicatorEvent::new(name, datetime, 1i64).unwrap()
    }

    #[test]
    fn test_pops_in_datetime_order() {
        let mut queue = EventQueue::new();
        let d1 = Utc.with_ymd_and_hms(2020, 9, 1, 9, 0, 0).unwrap();
        let d2 = Utc.with_ymd_and_hms(2020, 9, 1, 10, 0, 0).unwrap();
        let d3 = Utc.with_ymd_and_hms(2020, 9, 1, 11, 0, 0).unwrap();

        // Pushed out of order
        queue.push(indicator("second", d2));
        queue.push(indicator("third", d3));
        queue.push(indicator("first", d1));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.peek_datetime(), Some(d1));

        let order: Vec<DateTime<Utc>> = std::iter::from_fn(|| queue.pop())
            .map(|e| e.datetime())
            .collect();
        assert_eq!(order, vec![d1, d2, d3]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_equal_datetimes_preserve_insertion_order() {
        let mut queue = EventQueue::new();
        let d = Utc.with_ymd_and_hms(2020, 9, 1, 9, 0, 0).unwrap();
        for name in ["a", "b", "c"] {
            queue.push(indicator(name, d));
        }

        let names: Vec<String> = std::iter::from_fn(|| queue.pop())
            .map(|e| match e {
                crate::event::Event::Indicator(i) => i.indicator_name().to_string(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
