//! Priority queue of upcoming maturities (min-heap by maturity time)

use priority_queue::PriorityQueue;
use savevault_model::{Amount, Bucket, Timestamp};
use std::cmp::Reverse;
use std::collections::HashMap;

use crate::portfolio::DepositView;

/// A deposit still waiting to mature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upcoming {
    pub deposit_id: u64,
    pub maturity_time: Timestamp,
    pub principal: Amount,
    /// Principal plus full-term interest
    pub maturity_amount: Amount,
}

impl Upcoming {
    pub fn is_due(&self, now: Timestamp) -> bool {
        now >= self.maturity_time
    }
}

/// Earliest maturity first
pub struct MaturityQueue {
    queue: PriorityQueue<u64, Reverse<Timestamp>>,
    map: HashMap<u64, Upcoming>,
}

impl MaturityQueue {
    pub fn new() -> Self {
        Self {
            queue: PriorityQueue::new(),
            map: HashMap::new(),
        }
    }

    /// Queue the active deposits among `views`
    pub fn from_views<'a>(views: impl IntoIterator<Item = &'a DepositView>) -> Self {
        let mut queue = Self::new();
        for view in views.into_iter().filter(|v| v.bucket == Bucket::Active) {
            queue.push(Upcoming {
                deposit_id: view.deposit.deposit_id,
                maturity_time: view.deposit.maturity_time,
                principal: view.deposit.principal,
                maturity_amount: view.maturity_amount,
            });
        }
        queue
    }

    /// Push or replace an entry
    pub fn push(&mut self, upcoming: Upcoming) {
        let id = upcoming.deposit_id;
        let maturity = upcoming.maturity_time;
        self.map.insert(id, upcoming);
        self.queue.push(id, Reverse(maturity));
    }

    pub fn pop(&mut self) -> Option<Upcoming> {
        let (id, _) = self.queue.pop()?;
        self.map.remove(&id)
    }

    pub fn peek(&self) -> Option<&Upcoming> {
        let (id, _) = self.queue.peek()?;
        self.map.get(id)
    }

    pub fn remove(&mut self, deposit_id: u64) -> Option<Upcoming> {
        self.queue.remove(&deposit_id);
        self.map.remove(&deposit_id)
    }

    pub fn get(&self, deposit_id: u64) -> Option<&Upcoming> {
        self.map.get(&deposit_id)
    }

    pub fn contains(&self, deposit_id: u64) -> bool {
        self.map.contains_key(&deposit_id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Pop every entry that has matured by `now`, earliest first
    pub fn due(&mut self, now: Timestamp) -> Vec<Upcoming> {
        let mut due = Vec::new();
        while self.peek().is_some_and(|u| u.is_due(now)) {
            if let Some(upcoming) = self.pop() {
                due.push(upcoming);
            }
        }
        due
    }

    /// The next `n` maturities without removing them
    pub fn next(&self, n: usize) -> Vec<&Upcoming> {
        let mut entries: Vec<&Upcoming> = self.map.values().collect();
        entries.sort_by_key(|u| (u.maturity_time, u.deposit_id));
        entries.truncate(n);
        entries
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.map.clear();
    }
}

impl Default for MaturityQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upcoming(deposit_id: u64, maturity_time: Timestamp) -> Upcoming {
        Upcoming {
            deposit_id,
            maturity_time,
            principal: 1_000_000,
            maturity_amount: 1_010_000,
        }
    }

    #[test]
    fn test_earliest_first() {
        let mut queue = MaturityQueue::new();
        queue.push(upcoming(1, 300));
        queue.push(upcoming(2, 100));
        queue.push(upcoming(3, 200));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.peek().map(|u| u.deposit_id), Some(2));
        assert_eq!(queue.pop().map(|u| u.deposit_id), Some(2));
        assert_eq!(queue.pop().map(|u| u.deposit_id), Some(3));
        assert_eq!(queue.pop().map(|u| u.deposit_id), Some(1));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_push_replaces() {
        let mut queue = MaturityQueue::new();
        queue.push(upcoming(1, 300));
        queue.push(upcoming(2, 200));
        queue.push(upcoming(1, 100));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.peek().map(|u| u.deposit_id), Some(1));
        assert_eq!(queue.get(1).map(|u| u.maturity_time), Some(100));
    }

    #[test]
    fn test_remove() {
        let mut queue = MaturityQueue::new();
        queue.push(upcoming(1, 100));
        queue.push(upcoming(2, 200));

        assert!(queue.remove(1).is_some());
        assert!(!queue.contains(1));
        assert!(queue.remove(1).is_none());
        assert_eq!(queue.peek().map(|u| u.deposit_id), Some(2));
    }

    #[test]
    fn test_due() {
        let mut queue = MaturityQueue::new();
        queue.push(upcoming(1, 100));
        queue.push(upcoming(2, 200));
        queue.push(upcoming(3, 300));

        let due: Vec<u64> = queue.due(200).into_iter().map(|u| u.deposit_id).collect();
        assert_eq!(due, vec![1, 2]);
        assert_eq!(queue.len(), 1);
        assert!(queue.due(250).is_empty());
    }

    #[test]
    fn test_next_does_not_consume() {
        let mut queue = MaturityQueue::new();
        queue.push(upcoming(1, 300));
        queue.push(upcoming(2, 100));
        queue.push(upcoming(3, 200));

        let next: Vec<u64> = queue.next(2).iter().map(|u| u.deposit_id).collect();
        assert_eq!(next, vec![2, 3]);
        assert_eq!(queue.len(), 3);

        queue.clear();
        assert!(queue.is_empty());
    }
}
