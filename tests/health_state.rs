// ABOUTME: State-transition properties of the health record updater.
// ABOUTME: Pure tests over transition(), the ring bound and output clamping.

use chrono::Utc;
use std::time::Duration;
use stevedore::health::{
    CMD_SHELL, HealthRecord, HealthStatus, MAX_LOG_ENTRIES, ProbeResult, ProbeSpec, transition,
};

fn spec(retries: u32, start_period: Duration) -> ProbeSpec {
    ProbeSpec {
        test: vec![CMD_SHELL.to_string(), "true".to_string()],
        interval: Duration::from_secs(30),
        timeout: Duration::from_secs(30),
        start_period,
        retries,
    }
}

fn probe_result(exit_code: i32) -> ProbeResult {
    let now = Utc::now();
    ProbeResult {
        exit_code,
        timed_out: exit_code == -1,
        output: String::new(),
        start: now,
        end: now,
    }
}

const PAST_GRACE: Duration = Duration::from_secs(3600);

mod transitions {
    use super::*;

    #[test]
    fn success_sets_healthy_and_clears_streak() {
        let mut record = HealthRecord::starting(Utc::now());
        record.status = HealthStatus::Unhealthy;
        record.failing_streak = 4;

        transition(&mut record, &spec(3, Duration::ZERO), &probe_result(0), PAST_GRACE);

        assert_eq!(record.status, HealthStatus::Healthy);
        assert_eq!(record.failing_streak, 0);
    }

    #[test]
    fn zero_retries_means_one_failure_is_enough() {
        let mut record = HealthRecord::starting(Utc::now());

        transition(&mut record, &spec(0, Duration::ZERO), &probe_result(1), PAST_GRACE);

        assert_eq!(record.status, HealthStatus::Unhealthy);
        assert_eq!(record.failing_streak, 1);
    }

    #[test]
    fn below_threshold_failure_keeps_previous_status() {
        let mut record = HealthRecord::starting(Utc::now());
        record.status = HealthStatus::Healthy;

        transition(&mut record, &spec(3, Duration::ZERO), &probe_result(1), PAST_GRACE);

        assert_eq!(record.status, HealthStatus::Healthy);
        assert_eq!(record.failing_streak, 1);
    }

    #[test]
    fn threshold_failure_flips_to_unhealthy() {
        let mut record = HealthRecord::starting(Utc::now());
        record.status = HealthStatus::Healthy;
        record.failing_streak = 2;

        transition(&mut record, &spec(3, Duration::ZERO), &probe_result(1), PAST_GRACE);

        assert_eq!(record.status, HealthStatus::Unhealthy);
        assert_eq!(record.failing_streak, 3);
    }

    #[test]
    fn grace_failures_move_nothing_but_the_log() {
        let mut record = HealthRecord::starting(Utc::now());
        let spec = spec(2, Duration::from_secs(30));

        for _ in 0..3 {
            transition(&mut record, &spec, &probe_result(1), Duration::from_secs(3));
        }

        assert_eq!(record.status, HealthStatus::Starting);
        assert_eq!(record.failing_streak, 0);
        assert_eq!(record.log.len(), 3);
    }

    #[test]
    fn success_during_grace_ends_the_start_period() {
        let mut record = HealthRecord::starting(Utc::now());

        transition(
            &mut record,
            &spec(2, Duration::from_secs(300)),
            &probe_result(0),
            Duration::from_secs(1),
        );

        assert_eq!(record.status, HealthStatus::Healthy);
    }

    #[test]
    fn success_during_grace_recovers_an_unhealthy_container() {
        let mut record = HealthRecord::starting(Utc::now());
        record.status = HealthStatus::Unhealthy;
        record.failing_streak = 5;

        transition(
            &mut record,
            &spec(2, Duration::from_secs(300)),
            &probe_result(0),
            Duration::from_secs(1),
        );

        assert_eq!(record.status, HealthStatus::Healthy);
        assert_eq!(record.failing_streak, 0);
    }

    #[test]
    fn timeout_counts_as_a_failure() {
        let mut record = HealthRecord::starting(Utc::now());

        transition(&mut record, &spec(1, Duration::ZERO), &probe_result(-1), PAST_GRACE);

        assert_eq!(record.status, HealthStatus::Unhealthy);
        assert_eq!(record.failing_streak, 1);
        assert_eq!(record.log[0].exit_code, -1);
    }

    #[test]
    fn transition_is_deterministic() {
        let base = HealthRecord::starting(Utc::now());
        let spec = spec(3, Duration::from_secs(10));
        let result = probe_result(1);

        let mut a = base.clone();
        let mut b = base;
        transition(&mut a, &spec, &result, Duration::from_secs(20));
        transition(&mut b, &spec, &result, Duration::from_secs(20));

        assert_eq!(a, b);
    }

    #[test]
    fn healthy_implies_zero_streak_across_histories() {
        // Mixed histories never leave a healthy record with a streak.
        let outcomes = [1, 0, 1, 1, 0, 1, 0, 0, 1, 1, 1, 0];
        let mut record = HealthRecord::starting(Utc::now());
        let spec = spec(3, Duration::ZERO);

        for exit_code in outcomes {
            transition(&mut record, &spec, &probe_result(exit_code), PAST_GRACE);
            if record.status == HealthStatus::Healthy {
                assert_eq!(record.failing_streak, 0);
            }
            assert!(record.log.len() <= MAX_LOG_ENTRIES);
        }
    }

    #[test]
    fn record_stamps_follow_the_latest_probe() {
        let mut record = HealthRecord::starting(Utc::now());
        let result = probe_result(0);

        transition(&mut record, &spec(3, Duration::ZERO), &result, PAST_GRACE);

        assert_eq!(record.start, result.start);
        assert_eq!(record.end, result.end);
    }
}

mod roundtrip {
    use super::*;

    #[test]
    fn record_roundtrips_through_json() {
        let mut record = HealthRecord::starting(Utc::now());
        let spec = spec(2, Duration::ZERO);
        for exit_code in [0, 1, 1] {
            transition(&mut record, &spec, &probe_result(exit_code), PAST_GRACE);
        }

        let parsed = HealthRecord::from_json(&record.to_json().unwrap()).unwrap();
        assert_eq!(parsed, record);
    }
}
