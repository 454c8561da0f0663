use std::{cell::RefCell, rc::Rc};
use tickwatch::{Error, ManualTimer, Stopwatch, Timer, TokioTimer};
use tokio::{
    task::LocalSet,
    time::{sleep, Duration},
};

#[test]
fn elapsed_sums_running_segments() {
    let timer = ManualTimer::new();
    let stopwatch = Stopwatch::new(timer.clone());
    let mut expected = 0;
    for (run, rest) in [(120, 40), (3, 1_000), (999, 1)] {
        stopwatch.start();
        timer.advance(run);
        expected += run;
        assert_eq!(stopwatch.elapsed(), expected);
        stopwatch.pause();
        timer.advance(rest);
        assert_eq!(stopwatch.elapsed(), expected);
    }
    stopwatch.start();
    timer.advance(5);
    assert_eq!(stopwatch.elapsed(), expected + 5);
    assert_eq!(stopwatch.to_string(), "00:00:01.127");
}

#[test]
fn redundant_transitions_are_no_ops() {
    let timer = ManualTimer::new();
    let stopwatch = Stopwatch::new(timer.clone());
    stopwatch.pause();
    stopwatch.stop();
    assert!(!stopwatch.is_running());
    stopwatch.start();
    timer.advance(10);
    stopwatch.start();
    timer.advance(10);
    assert_eq!(stopwatch.elapsed(), 20);
    stopwatch.stop();
    assert_eq!(stopwatch.elapsed(), 0);
    stopwatch.start();
    timer.advance(10);
    assert_eq!(stopwatch.elapsed(), 10);
}

#[test]
fn start_time_seeding() {
    let stopwatch = Stopwatch::new(ManualTimer::new());
    assert_eq!(stopwatch.set_start_time("00:01:30"), Ok(()));
    assert_eq!(stopwatch.elapsed(), 90_000);
    assert!(matches!(stopwatch.set_start_time("1:2:3"), Err(Error::InvalidFormat { .. })));
    assert_eq!(stopwatch.elapsed(), 90_000);
}

#[test]
fn ticks_land_on_whole_seconds_of_elapsed_time() {
    let timer = ManualTimer::new();
    let stopwatch = Stopwatch::new(timer.clone());
    stopwatch.start();
    timer.advance(1_337);
    let fires = Rc::new(RefCell::new(Vec::new()));
    let sink = fires.clone();
    let weak = stopwatch.downgrade();
    stopwatch
        .on_tick(move || {
            if let Some(stopwatch) = weak.upgrade() {
                sink.borrow_mut().push(stopwatch.elapsed());
            }
        })
        .unwrap();
    for (run, rest) in [(2_100, 500), (450, 3_000), (4_000, 0)] {
        timer.advance(run);
        stopwatch.pause();
        timer.advance(rest);
        stopwatch.start();
    }
    let fires = fires.borrow();
    assert_eq!(fires.len(), 6);
    assert!(fires.iter().all(|elapsed| elapsed % 1_000 == 0));
    assert!(fires.windows(2).all(|pair| pair[1] == pair[0] + 1_000));
}

#[test]
fn nothing_fires_while_paused() {
    let timer = ManualTimer::new();
    let stopwatch = Stopwatch::new(timer.clone());
    let count = Rc::new(RefCell::new(0));
    let counter = count.clone();
    stopwatch.subscribe(move || *counter.borrow_mut() += 1, 50, false).unwrap();
    stopwatch.start();
    timer.advance(175);
    stopwatch.pause();
    assert_eq!(*count.borrow(), 3);
    assert_eq!(timer.pending(), 0);
    timer.advance(10_000);
    assert_eq!(*count.borrow(), 3);
    stopwatch.start();
    assert_eq!(timer.delays().last(), Some(&(50 - 175 % 50)));
}

#[tokio::test(start_paused = true)]
async fn tokio_host_keeps_ticks_aligned() {
    LocalSet::new()
        .run_until(async {
            let timer = TokioTimer::new();
            let stopwatch = Stopwatch::new(timer);
            let fires = Rc::new(RefCell::new(Vec::new()));
            stopwatch.start();
            sleep(Duration::from_millis(250)).await;
            let sink = fires.clone();
            let weak = stopwatch.downgrade();
            stopwatch
                .subscribe(
                    move || {
                        if let Some(stopwatch) = weak.upgrade() {
                            sink.borrow_mut().push(stopwatch.elapsed());
                        }
                    },
                    100,
                    false,
                )
                .unwrap();
            sleep(Duration::from_millis(360)).await;
            assert_eq!(*fires.borrow(), vec![300, 400, 500, 600]);

            stopwatch.pause();
            sleep(Duration::from_millis(1_000)).await;
            assert_eq!(fires.borrow().len(), 4);
            assert_eq!(stopwatch.elapsed(), 610);

            stopwatch.start();
            sleep(Duration::from_millis(100)).await;
            assert_eq!(*fires.borrow(), vec![300, 400, 500, 600, 700]);
            assert_eq!(timer.now(), 1_710);
        })
        .await;
}
