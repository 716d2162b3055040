use femcore::iterate::{StopCriterion, StopList};
use femcore::Error;
use util::assert_panics;

#[test]
fn stops_once_window_has_converged() {
    let sequence = [5.0, 50.0, 0.5, 0.05, 0.005, 0.0005, 0.0005, 0.0005, 0.0005, 0.0005];
    let mut stop = StopList::new(1e-3, 5);
    let decisions: Vec<bool> = sequence.iter().map(|&value| stop.stop(value)).collect();
    let mut expected = vec![false; 10];
    expected[9] = true;
    assert_eq!(decisions, expected);
}

#[test]
fn reset_forgets_history() {
    let mut stop = StopList::new(0.1, 2);
    assert!(!stop.stop(1.0));
    assert!(stop.stop(1.05));
    stop.reset();
    assert!(!stop.stop(1.05));
    assert!(stop.stop(1.0));
    // Values more than the tolerance from the oldest value in the window do not stop
    assert!(!stop.stop(1.2));
}

#[test]
fn window_of_one_stops_immediately() {
    let mut stop = StopList::new(0.0, 1);
    assert!(stop.stop(42.0));
}

#[test]
fn empty_window_panics() {
    assert_panics!(StopList::new(1e-3, 0));
}

#[test]
fn criterion_configures_stop_list() -> eyre::Result<()> {
    let criterion: StopCriterion = serde_json::from_str(r#"{ "tolerance": 0.5, "window": 3 }"#)?;
    let stop = StopList::<f64>::from_criterion(&criterion)?;
    assert_eq!(stop.tolerance(), 0.5);
    assert_eq!(stop.window(), 3);
    assert_eq!(serde_json::from_str::<StopCriterion>(&serde_json::to_string(&criterion)?)?, criterion);
    Ok(())
}

#[test]
fn unsatisfiable_criterion_is_rejected() -> eyre::Result<()> {
    let empty: StopCriterion = serde_json::from_str(r#"{ "tolerance": 0.5, "window": 0 }"#)?;
    assert!(matches!(
        StopList::<f64>::from_criterion(&empty),
        Err(Error::InvalidStopCriterion { .. })
    ));

    for tolerance in [-1.0, f64::NAN, f64::INFINITY] {
        let criterion = StopCriterion { tolerance, window: 3 };
        assert!(matches!(
            StopList::<f64>::from_criterion(&criterion),
            Err(Error::InvalidStopCriterion { .. })
        ));
    }

    assert_eq!(StopList::<f64>::from_criterion(&StopCriterion::default())?.window(), 5);
    Ok(())
}
