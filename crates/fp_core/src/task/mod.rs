use std::{
    sync::{
        atomic::{AtomicI32, Ordering},
        mpsc::{Receiver, RecvError, SendError, Sender, TryRecvError},
        Arc,
    },
    thread::JoinHandle,
};

/// A single background worker fed through a channel.
///
/// Tasks are processed one at a time in submission order. The counter is raised
/// when a task is submitted and lowered once its result has been produced, so
/// `is_running` is already true when `send` returns.
pub struct AsyncTaskGuard<TaskItem, ResultItem> {
    task_sender: Sender<TaskItem>,
    result_receiver: Receiver<ResultItem>,
    _thread_task: JoinHandle<()>,
    nb: Arc<AtomicI32>,
}

impl<TaskItem, ResultItem> AsyncTaskGuard<TaskItem, ResultItem>
where
    TaskItem: Send + 'static,
    ResultItem: Send + 'static,
{
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(TaskItem) -> ResultItem + Send + 'static,
    {
        //https://doc.rust-lang.org/rust-by-example/std_misc/channels.html
        let (task_sender, th_task_receiver) = std::sync::mpsc::channel::<TaskItem>();
        let (th_result_sender, result_receiver) = std::sync::mpsc::channel();
        let nb = Arc::new(AtomicI32::new(0));
        let th_nb = Arc::clone(&nb);
        let thread_task = std::thread::spawn(move || {
            while let Ok(elt) = th_task_receiver.recv() {
                let result = {
                    // lowered even if `f` panics
                    let _guard = scopeguard::guard((), |_| {
                        th_nb.fetch_sub(1, Ordering::SeqCst);
                    });
                    f(elt)
                };
                if th_result_sender.send(result).is_err() {
                    tracing::debug!("task result dropped, the receiving side is gone");
                }
            }
        });
        Self {
            task_sender,
            result_receiver,
            _thread_task: thread_task,
            nb,
        }
    }

    pub fn send(&self, value: TaskItem) -> Result<(), SendError<TaskItem>> {
        self.nb.fetch_add(1, Ordering::SeqCst);
        self.task_sender.send(value).map_err(|e| {
            self.nb.fetch_sub(1, Ordering::SeqCst);
            e
        })
    }
    pub fn recv(&self) -> Result<ResultItem, RecvError> {
        self.result_receiver.recv()
    }
    pub fn try_recv(&self) -> Result<ResultItem, TryRecvError> {
        self.result_receiver.try_recv()
    }

    pub fn count(&self) -> i32 {
        self.nb.load(Ordering::SeqCst)
    }
    pub fn is_running(&self) -> bool {
        self.count() != 0
    }
}

#[cfg(test)]
mod test {
    use super::AsyncTaskGuard;
    use std::sync::mpsc::channel;

    #[test]
    fn results_come_back_in_order() {
        let task = AsyncTaskGuard::new(|x: u32| x * 2);
        task.send(1).unwrap();
        task.send(2).unwrap();
        assert_eq!(task.recv().unwrap(), 2);
        assert_eq!(task.recv().unwrap(), 4);
        assert!(!task.is_running());
    }

    #[test]
    fn running_until_the_task_finishes() {
        let (release, gate) = channel::<()>();
        let gate = std::sync::Mutex::new(gate);
        let task = AsyncTaskGuard::new(move |x: u32| {
            gate.lock().unwrap().recv().unwrap();
            x
        });
        task.send(7).unwrap();
        assert!(task.is_running());
        assert!(task.try_recv().is_err());
        release.send(()).unwrap();
        assert_eq!(task.recv().unwrap(), 7);
        assert_eq!(task.count(), 0);
    }
}
