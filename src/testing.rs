use std::sync::Mutex;
use std::thread;

use crate::acl::{AclBinding, AclOperation, AclPermissionType, ResourcePatternType};
use crate::aggregate::{AggregateCompleter, AggregateOutcome};
use crate::config::ResourceType;
use crate::native::{AdminRequest, NativeClient};
use crate::options::AdminOptions;

type Responder = Box<dyn Fn(&AdminRequest) -> AggregateOutcome + Send + Sync>;

/// Native client double: records every submission.
///
/// Either holds on to the aggregate completions, for the test to resolve (or drop),
/// or resolves them from a separate thread, as a real native client would.
pub(crate) struct MockNative {
    submissions: Mutex<Vec<(AdminRequest, AdminOptions)>>,
    held: Mutex<Vec<AggregateCompleter>>,
    responder: Option<Responder>,
}

impl MockNative {
    pub(crate) fn holding() -> Self {
        Self {
            submissions: Mutex::new(Vec::new()),
            held: Mutex::new(Vec::new()),
            responder: None,
        }
    }

    pub(crate) fn responding<F>(respond: F) -> Self
    where
        F: Fn(&AdminRequest) -> AggregateOutcome + Send + Sync + 'static,
    {
        Self {
            responder: Some(Box::new(respond)),
            ..Self::holding()
        }
    }

    pub(crate) fn submissions(&self) -> Vec<(AdminRequest, AdminOptions)> {
        self.submissions.lock().unwrap().clone()
    }

    pub(crate) fn submit_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    pub(crate) fn take_held(&self) -> Vec<AggregateCompleter> {
        std::mem::take(&mut *self.held.lock().unwrap())
    }
}

impl NativeClient for MockNative {
    fn submit(&self, request: AdminRequest, options: AdminOptions, completion: AggregateCompleter) {
        assert_eq!(request.operation(), completion.operation());

        match &self.responder {
            Some(respond) => {
                let outcome = respond(&request);
                thread::spawn(move || completion.resolve(outcome));
            },
            None => self.held.lock().unwrap().push(completion),
        }

        self.submissions.lock().unwrap().push((request, options));
    }
}

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub(crate) fn acl_binding(principal: &str) -> AclBinding {
    AclBinding {
        restype: ResourceType::Topic,
        name: "orders".into(),
        resource_pattern_type: ResourcePatternType::Literal,
        principal: principal.into(),
        host: "*".into(),
        operation: AclOperation::Read,
        permission_type: AclPermissionType::Allow,
    }
}
