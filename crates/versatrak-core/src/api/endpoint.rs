//! Route table for the VersaTrak REST API.
//!
//! Every call the client makes is described by an [`Endpoint`]: HTTP method,
//! path relative to the base URL, and whether it needs a live session. The
//! read-only resource routes are enumerated once in a single static table.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use reqwest::Method;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub method: Method,
    pub path: Cow<'static, str>,
    pub requires_auth: bool,
}

impl Endpoint {
    const fn fixed(method: Method, path: &'static str, requires_auth: bool) -> Self {
        Self {
            method,
            path: Cow::Borrowed(path),
            requires_auth,
        }
    }

    pub const INSTANCE_LIST: Endpoint =
        Endpoint::fixed(Method::GET, "usersession/action/instanceList", false);
    pub const LOGON: Endpoint = Endpoint::fixed(Method::POST, "usersession/action/logon", false);
    pub const IS_LOGGED_ON: Endpoint =
        Endpoint::fixed(Method::GET, "usersession/action/isloggedon", false);
    pub const REFRESH_AUTH_TOKEN: Endpoint =
        Endpoint::fixed(Method::POST, "usersession/action/refreshAuthToken", false);
    pub const LOGOFF: Endpoint = Endpoint::fixed(Method::POST, "usersession/action/logoff", true);

    pub fn history_data(object_id: &str) -> Self {
        Self {
            method: Method::POST,
            path: Cow::Owned(format!("monitoredObject/action/gethistorydata/{}", object_id)),
            requires_auth: true,
        }
    }

    pub fn user(user_id: &str) -> Self {
        Self {
            method: Method::GET,
            path: Cow::Owned(format!("user/{}", user_id)),
            requires_auth: true,
        }
    }

    /// Only side-effect-free GETs are retried on transient statuses.
    pub fn is_retryable(&self) -> bool {
        self.method == Method::GET
    }
}

/// Read-only resource collections exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    UserRoles,
    Functions,
    Watchlist,
    EditUsersList,
    Users,
    CurrentStatus,
    MonitoredObjects,
    Departments,
    Locations,
    UnitsOfMeasure,
    Policies,
    MonitoredObjectTypes,
    MonitorPointTypes,
    ProbeTypes,
    SystemInfo,
}

struct Route {
    resource: Resource,
    name: &'static str,
    method: Method,
    path: &'static str,
}

const fn route(resource: Resource, name: &'static str, method: Method, path: &'static str) -> Route {
    Route {
        resource,
        name,
        method,
        path,
    }
}

static RESOURCES: [Route; 15] = [
    route(Resource::UserRoles, "user-roles", Method::GET, "userrole"),
    route(Resource::Functions, "functions", Method::GET, "userrole/action/functions"),
    route(Resource::Watchlist, "watchlist", Method::GET, "user/action/watchlist"),
    route(Resource::EditUsersList, "edit-users-list", Method::POST, "user/action/getEditUsersList"),
    route(Resource::Users, "users", Method::GET, "user"),
    route(Resource::CurrentStatus, "current-status", Method::GET, "currentstatus"),
    route(Resource::MonitoredObjects, "monitored-objects", Method::GET, "monitoredobject/action/getall"),
    route(Resource::Departments, "departments", Method::GET, "department"),
    route(Resource::Locations, "locations", Method::GET, "location"),
    route(Resource::UnitsOfMeasure, "units-of-measure", Method::GET, "uom"),
    route(Resource::Policies, "policies", Method::GET, "policy"),
    route(Resource::MonitoredObjectTypes, "monitored-object-types", Method::GET, "monitoredObjectType"),
    route(Resource::MonitorPointTypes, "monitor-point-types", Method::GET, "monitorPointType"),
    route(Resource::ProbeTypes, "probe-types", Method::GET, "sensortype/probetypes"),
    route(Resource::SystemInfo, "system-info", Method::GET, "system/action/sysinfo"),
];

impl Resource {
    pub fn all() -> impl Iterator<Item = Resource> {
        RESOURCES.iter().map(|r| r.resource)
    }

    fn route(self) -> &'static Route {
        // The table has exactly one row per variant, in declaration order.
        &RESOURCES[self as usize]
    }

    /// Kebab-case name used on the command line.
    pub fn name(self) -> &'static str {
        self.route().name
    }

    pub fn endpoint(self) -> Endpoint {
        let route = self.route();
        Endpoint {
            method: route.method.clone(),
            path: Cow::Borrowed(route.path),
            requires_auth: true,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RESOURCES
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(s))
            .map(|r| r.resource)
            .ok_or_else(|| {
                let names: Vec<&str> = RESOURCES.iter().map(|r| r.name).collect();
                format!("unknown resource '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_table_matches_variants() {
        for (index, route) in RESOURCES.iter().enumerate() {
            assert_eq!(route.resource as usize, index, "row {} out of order", route.name);
        }
    }

    #[test]
    fn test_resource_name_round_trips() {
        for resource in Resource::all() {
            assert_eq!(resource.name().parse::<Resource>(), Ok(resource));
        }
        assert_eq!("DEPARTMENTS".parse::<Resource>(), Ok(Resource::Departments));
        assert!("sensors".parse::<Resource>().is_err());
    }

    #[test]
    fn test_resource_endpoints_require_auth() {
        assert!(Resource::all().all(|r| r.endpoint().requires_auth));
        let edit = Resource::EditUsersList.endpoint();
        assert_eq!(edit.method, Method::POST);
        assert!(!edit.is_retryable());
        assert!(Resource::SystemInfo.endpoint().is_retryable());
    }

    #[test]
    fn test_parameterized_paths() {
        assert_eq!(
            Endpoint::history_data("42").path,
            "monitoredObject/action/gethistorydata/42"
        );
        assert_eq!(Endpoint::user("7").path, "user/7");
        assert!(!Endpoint::LOGON.requires_auth);
        assert!(Endpoint::LOGOFF.requires_auth);
    }
}
