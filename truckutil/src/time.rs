use std::time::Instant;

use log::Level;

use crate::prettyprint_usize;

const PROGRESS_FREQUENCY_SECONDS: f64 = 5.0;

pub fn elapsed_seconds(since: Instant) -> f64 {
    since.elapsed().as_secs_f64()
}

pub fn prettyprint_time(seconds: f64) -> String {
    format!("{:.4}s", seconds)
}

struct Progress {
    label: String,
    processed_items: usize,
    total_items: usize,
    started_at: Instant,
    last_logged_at: Instant,
}

impl Progress {
    fn new(label: &str, total_items: usize) -> Progress {
        Progress {
            label: label.to_string(),
            processed_items: 0,
            total_items,
            started_at: Instant::now(),
            last_logged_at: Instant::now(),
        }
    }

    // Returns the finished line and elapsed time when done
    fn next(&mut self, level: Level) -> Option<(f64, String)> {
        self.processed_items += 1;
        if self.processed_items > self.total_items {
            panic!(
                "{} is too few items for {} progress",
                prettyprint_usize(self.total_items),
                self.label
            );
        }

        if self.processed_items == self.total_items {
            let elapsed = elapsed_seconds(self.started_at);
            let line = format!(
                "{} ({})... {}",
                self.label,
                prettyprint_usize(self.total_items),
                prettyprint_time(elapsed)
            );
            log!(level, "{}", line);
            return Some((elapsed, line));
        }

        if elapsed_seconds(self.last_logged_at) >= PROGRESS_FREQUENCY_SECONDS {
            self.last_logged_at = Instant::now();
            log!(
                level,
                "{}: {}/{}... {}",
                self.label,
                prettyprint_usize(self.processed_items),
                prettyprint_usize(self.total_items),
                prettyprint_time(elapsed_seconds(self.started_at))
            );
        }
        None
    }
}

struct TimerSpan {
    name: String,
    started_at: Instant,
    nested_results: Vec<String>,
    nested_time: f64,
}

enum StackEntry {
    Span(TimerSpan),
    Progress(Progress),
}

/// Hierarchical timing for the phases of a long run. Spans and progress are logged as they happen,
/// and when the Timer is dropped, the whole tree of spans is logged again as a summary, along with
/// any warnings collected along the way.
pub struct Timer {
    results: Vec<String>,
    stack: Vec<StackEntry>,
    outermost_name: String,
    warnings: Vec<String>,
    level: Level,
}

impl Timer {
    pub fn new<S: Into<String>>(name: S) -> Timer {
        Timer::with_level(name.into(), Level::Info)
    }

    /// For callers that need a Timer but don't care about its output. Everything is logged at
    /// debug level.
    pub fn throwaway() -> Timer {
        Timer::with_level("throwaway".to_string(), Level::Debug)
    }

    fn with_level(name: String, level: Level) -> Timer {
        let mut t = Timer {
            results: Vec::new(),
            stack: Vec::new(),
            outermost_name: name.clone(),
            warnings: Vec::new(),
            level,
        };
        t.start(name);
        t
    }

    /// Repeated in the summary when the Timer is dropped.
    pub fn warn(&mut self, line: String) {
        warn!("{}", line);
        self.warnings.push(line);
    }

    pub fn start<S: Into<String>>(&mut self, name: S) {
        let name = name.into();
        log!(self.level, "{}...", name);
        self.stack.push(StackEntry::Span(TimerSpan {
            name,
            started_at: Instant::now(),
            nested_results: Vec::new(),
            nested_time: 0.0,
        }));
    }

    pub fn stop<S: Into<String>>(&mut self, name: S) {
        let name = name.into();
        let span = match self.stack.pop() {
            Some(StackEntry::Span(s)) => s,
            _ => panic!("Timer::stop({}) doesn't match a start()", name),
        };
        assert_eq!(span.name, name);
        let elapsed = elapsed_seconds(span.started_at);
        let line = format!("{} took {}", name, prettyprint_time(elapsed));
        if span.nested_time != 0.0 {
            log!(
                self.level,
                "{}... plus {} outside nested spans",
                name,
                prettyprint_time(elapsed - span.nested_time)
            );
        }

        let padding = "  ".repeat(self.stack.len());
        match self.stack.last_mut() {
            Some(StackEntry::Span(ref mut s)) => {
                s.nested_results.push(format!("{}- {}", padding, line));
                s.nested_results.extend(span.nested_results);
                s.nested_time += elapsed;
            }
            Some(StackEntry::Progress(_)) => {
                panic!("Timer::stop({}) while a progress counter is running", name)
            }
            None => {
                self.results.push(format!("{}- {}", padding, line));
                self.results.extend(span.nested_results);
            }
        }

        log!(self.level, "{}", line);
    }

    pub fn start_iter(&mut self, name: &str, total_items: usize) {
        if total_items == 0 {
            return;
        }
        if let Some(StackEntry::Progress(p)) = self.stack.last() {
            panic!(
                "Can't start_iter({}) while Progress({}) is top of the stack",
                name, p.label
            );
        }

        self.stack
            .push(StackEntry::Progress(Progress::new(name, total_items)));
    }

    pub fn next(&mut self) {
        let level = self.level;
        let maybe_result = if let Some(StackEntry::Progress(ref mut progress)) =
            self.stack.last_mut()
        {
            progress.next(level)
        } else {
            panic!("Can't next() while a TimerSpan is top of the stack");
        };
        if let Some((elapsed, line)) = maybe_result {
            self.stack.pop();
            self.add_result(elapsed, line);
        }
    }

    fn add_result(&mut self, elapsed: f64, line: String) {
        let padding = "  ".repeat(self.stack.len());
        match self.stack.last_mut() {
            Some(StackEntry::Span(ref mut s)) => {
                s.nested_results.push(format!("{}- {}", padding, line));
                s.nested_time += elapsed;
            }
            Some(StackEntry::Progress(_)) => unreachable!(),
            None => {
                self.results.push(format!("{}- {}", padding, line));
            }
        }
    }

    /// Run `cb` over every request using a pool of `num_threads` threads. The results are
    /// returned in the same order as the requests, regardless of which thread finished first.
    pub fn parallelize<I, O, F>(
        &mut self,
        timer_name: &str,
        num_threads: usize,
        requests: Vec<I>,
        cb: F,
    ) -> Vec<O>
    where
        I: Send,
        O: Send,
        F: Fn(I) -> O + Sync,
    {
        let total = requests.len();
        let mut results: Vec<Option<O>> = std::iter::repeat_with(|| None).take(total).collect();

        scoped_threadpool::Pool::new(num_threads.max(1) as u32).scoped(|scope| {
            let (tx, rx) = std::sync::mpsc::channel();
            let cb = &cb;
            for (idx, req) in requests.into_iter().enumerate() {
                let tx = tx.clone();
                scope.execute(move || {
                    // The receiver only goes away after every job has reported
                    let _ = tx.send((idx, cb(req)));
                });
            }
            drop(tx);

            self.start_iter(timer_name, total);
            for (idx, result) in rx.iter() {
                self.next();
                results[idx] = Some(result);
            }
        });

        let results: Vec<O> = results.into_iter().flatten().collect();
        assert_eq!(results.len(), total, "{} lost results", timer_name);
        results
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        // If we're in the middle of unwinding a panic, don't further blow up.
        if std::thread::panicking() {
            return;
        }
        let stop_name = self.outermost_name.clone();
        match self.stack.last() {
            Some(StackEntry::Span(ref s)) if s.name == stop_name && self.stack.len() == 1 => {}
            _ => {
                warn!("Timer {} dropped with unfinished spans", stop_name);
                return;
            }
        }

        self.stop(stop_name);
        for line in &self.results {
            log!(self.level, "{}", line);
        }

        if !self.warnings.is_empty() {
            log!(self.level, "{} warnings:", self.warnings.len());
            for line in &self.warnings {
                log!(self.level, "{}", line);
            }
        }
    }
}
