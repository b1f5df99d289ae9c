use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// 周期计时器的句柄。
pub type TimerHandle = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Tick { handle: TimerHandle, period: u64 },
    HideUnmatched,
    DeclareVictory,
}

#[derive(Debug, Clone)]
struct ScheduledTask {
    due: u64,
    order: u64,
    kind: TaskKind,
}

impl PartialEq for ScheduledTask {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.order == other.order
    }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledTask {
    // BinaryHeap 是大顶堆：越早到期、越早入队的任务排在越前面。
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.order.cmp(&self.order))
    }
}

/// 单线程虚拟时钟上的任务队列，时间单位为毫秒。
#[derive(Debug, Default)]
pub struct Scheduler {
    heap: BinaryHeap<ScheduledTask>,
    order: u64,
    now: u64,
    next_handle: TimerHandle,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn schedule(&mut self, delay: u64, kind: TaskKind) {
        self.order += 1;
        self.heap.push(ScheduledTask {
            due: self.now.saturating_add(delay),
            order: self.order,
            kind,
        });
    }

    /// 启动一个周期任务，第一次触发在一个周期之后。
    pub fn start_interval(&mut self, period: u64) -> TimerHandle {
        self.next_handle += 1;
        let handle = self.next_handle;
        self.schedule(period, TaskKind::Tick { handle, period });
        handle
    }

    pub fn cancel_interval(&mut self, handle: TimerHandle) {
        self.heap.retain(|task| {
            !matches!(task.kind, TaskKind::Tick { handle: pending, .. } if pending == handle)
        });
    }

    /// 取出 `until` 之前到期的最早任务，并把时钟推进到它的到期时间。
    pub fn pop_due(&mut self, until: u64) -> Option<TaskKind> {
        if self.heap.peek()?.due > until {
            return None;
        }
        let task = self.heap.pop()?;
        self.now = self.now.max(task.due);
        Some(task.kind)
    }

    /// 没有更多到期任务时，把时钟推进到 `until`。
    pub fn settle(&mut self, until: u64) {
        self.now = self.now.max(until);
    }

    pub fn next_due(&self) -> Option<u64> {
        self.heap.peek().map(|task| task.due)
    }

    pub fn next_due_in(&self) -> Option<u64> {
        self.next_due().map(|due| due.saturating_sub(self.now))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
