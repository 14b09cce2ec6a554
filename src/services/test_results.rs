//! Post-setup verification battery shown once the stack is healthy.

use serde::Serialize;

use crate::application::config::Config;
use crate::services::docker::ContainerRuntime;
use crate::services::probe::HttpProbe;
use crate::services::readiness::ServiceKind;

/// Configuration checks performed by the setup scripts before containers start
pub const CONFIGURATION_CHECKS: u32 = 14;
pub const INTEGRATION_CHECKS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuiteStatus {
    Passed,
    Partial,
    Failed,
    Pending,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestSuite {
    pub passed: u32,
    pub total: u32,
    pub status: SuiteStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestResults {
    pub configuration: TestSuite,
    pub services: TestSuite,
    pub integration: TestSuite,
}

pub fn services_suite(healthy: u32, total: u32) -> TestSuite {
    let status = if healthy == total {
        SuiteStatus::Passed
    } else if healthy > 0 {
        SuiteStatus::Partial
    } else {
        SuiteStatus::Failed
    };
    TestSuite {
        passed: healthy,
        total,
        status,
    }
}

/// Integration only counts once at least three services are up and the API answers
pub fn integration_suite(services_passed: u32, api_answering: bool) -> TestSuite {
    if services_passed < INTEGRATION_CHECKS || !api_answering {
        return TestSuite {
            passed: 0,
            total: INTEGRATION_CHECKS,
            status: SuiteStatus::Pending,
        };
    }

    let passed = services_passed.min(INTEGRATION_CHECKS);
    TestSuite {
        passed,
        total: INTEGRATION_CHECKS,
        status: if passed == INTEGRATION_CHECKS {
            SuiteStatus::Passed
        } else {
            SuiteStatus::Partial
        },
    }
}

pub async fn run(config: &Config, runtime: &dyn ContainerRuntime, http: &HttpProbe) -> TestResults {
    let kinds = ServiceKind::all();
    let mut healthy = 0u32;

    for kind in kinds {
        let name = config.setup.container_name(kind.container_suffix());
        if runtime.inspect(&name).await.is_running_and_healthy() {
            healthy += 1;
        }
    }

    let services = services_suite(healthy, kinds.len() as u32);

    let api_answering = if services.passed >= INTEGRATION_CHECKS {
        http.is_reachable(&config.setup.api_status_url).await
    } else {
        false
    };

    tracing::debug!(
        "Test battery: {}/{} containers healthy, API answering: {}",
        services.passed,
        services.total,
        api_answering
    );

    TestResults {
        configuration: TestSuite {
            passed: CONFIGURATION_CHECKS,
            total: CONFIGURATION_CHECKS,
            status: SuiteStatus::Passed,
        },
        integration: integration_suite(services.passed, api_answering),
        services,
    }
}
