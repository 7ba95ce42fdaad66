//! Operation registry
//!
//! Maps every logical service operation to its HTTP method and path
//! template. Path arguments are interpolated positionally into `{}`
//! placeholders.

use crate::error::{Error, Result};
use crate::types::Method;
use std::fmt;
use std::str::FromStr;
use tracing::error;
use url::form_urlencoded;

/// A resolved method and fully-interpolated path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub operation: Operation,
    pub method: Method,
    pub path: String,
}

macro_rules! operations {
    ($($name:ident => $method:ident $template:literal,)+) => {
        /// Every operation exposed by the pipeline and log storage services
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Operation {
            $($name,)+
        }

        impl Operation {
            /// All registered operations
            pub const ALL: &'static [Operation] = &[$(Operation::$name,)+];

            /// Operation name, e.g. `CreateExport`
            pub fn name(self) -> &'static str {
                match self {
                    $(Operation::$name => stringify!($name),)+
                }
            }

            pub fn method(self) -> Method {
                match self {
                    $(Operation::$name => Method::$method,)+
                }
            }

            /// Path template with `{}` placeholders
            pub fn template(self) -> &'static str {
                match self {
                    $(Operation::$name => $template,)+
                }
            }
        }
    };
}

operations! {
    // Pipeline: groups
    CreateGroup => POST "/v2/groups/{}",
    UpdateGroup => PUT "/v2/groups/{}",
    StartGroupTask => POST "/v2/groups/{}/actions/start",
    StopGroupTask => POST "/v2/groups/{}/actions/stop",
    ListGroups => GET "/v2/groups",
    GetGroup => GET "/v2/groups/{}",
    DeleteGroup => DELETE "/v2/groups/{}",

    // Pipeline: repos and ingestion
    CreateRepo => POST "/v2/repos/{}",
    ListRepos => GET "/v2/repos",
    GetRepo => GET "/v2/repos/{}",
    DeleteRepo => DELETE "/v2/repos/{}",
    PostData => POST "/v2/repos/{}/data",

    // Pipeline: transforms
    CreateTransform => POST "/v2/repos/{}/transforms/{}/to/{}",
    ListTransforms => GET "/v2/repos/{}/transforms",
    GetTransform => GET "/v2/repos/{}/transforms/{}",
    DeleteTransform => DELETE "/v2/repos/{}/transforms/{}",

    // Pipeline: exports
    CreateExport => POST "/v2/repos/{}/exports/{}",
    ListExports => GET "/v2/repos/{}/exports",
    GetExport => GET "/v2/repos/{}/exports/{}",
    DeleteExport => DELETE "/v2/repos/{}/exports/{}?delOffset={}",

    // Pipeline: plugins
    UploadPlugin => POST "/v2/plugins/{}",
    ListPlugins => GET "/v2/plugins",
    GetPlugin => GET "/v2/plugins/{}",
    DeletePlugin => DELETE "/v2/plugins/{}",

    // Pipeline: dry runs
    VerifyTransform => POST "/v2/verify/transform",
    VerifyExport => POST "/v2/verify/export",

    // Log storage
    LogdbCreateRepo => POST "/v5/repos/{}",
    LogdbUpdateRepo => PUT "/v5/repos/{}",
    LogdbGetRepo => GET "/v5/repos/{}",
    LogdbListRepos => GET "/v5/repos",
    LogdbDeleteRepo => DELETE "/v5/repos/{}",
    LogdbSendLog => POST "/v5/repos/{}/data?omitInvalidLog={}",
    LogdbQueryLog => GET "/v5/repos/{}/search?q={}&sort={}&from={}&size={}",
    LogdbQueryLogHighlight => POST "/v5/repos/{}/s",
    LogdbQueryHistogram => GET "/v5/repos/{}/histogram?q={}&from={}&to={}&field={}",
    LogdbPutRepoConfig => POST "/v5/repos/{}/config",
    LogdbGetRepoConfig => GET "/v5/repos/{}/config",
}

impl Operation {
    /// Number of positional arguments the template expects
    pub fn arity(self) -> usize {
        self.template().matches("{}").count()
    }

    /// Interpolate path arguments into the template.
    ///
    /// Arguments filling path segments are percent-encoded, so a name can
    /// never address a different resource. Query-string arguments are
    /// inserted as given; callers encode them.
    ///
    /// A mismatch between the template's placeholders and `args` means the
    /// registry and its caller disagree; that is reported as
    /// [`Error::Internal`] instead of producing a malformed path.
    pub fn route(self, args: &[&str]) -> Result<Route> {
        let expected = self.arity();
        if args.len() != expected {
            error!(
                "operation {} expects {} path arguments, got {}",
                self.name(),
                expected,
                args.len()
            );
            return Err(Error::internal(format!(
                "operation {} expects {expected} path arguments, got {}",
                self.name(),
                args.len()
            )));
        }

        let mut path = String::with_capacity(self.template().len() + 16);
        let mut pieces = self.template().split("{}");
        if let Some(first) = pieces.next() {
            path.push_str(first);
        }
        for (piece, arg) in pieces.zip(args) {
            if path.contains('?') {
                path.push_str(arg);
            } else {
                push_segment(&mut path, arg);
            }
            path.push_str(piece);
        }

        Ok(Route {
            operation: self,
            method: self.method(),
            path,
        })
    }
}

/// Append `segment` with everything but unreserved characters encoded
fn push_segment(path: &mut String, segment: &str) {
    for part in form_urlencoded::byte_serialize(segment.as_bytes()) {
        // `byte_serialize` writes spaces as `+`; a literal `+` is already `%2B`
        path.push_str(&part.replace('+', "%20"));
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        Operation::ALL
            .iter()
            .copied()
            .find(|op| op.name() == name)
            .ok_or_else(|| {
                error!("unmatched operation name: {}", name);
                Error::UnknownOperation {
                    name: name.to_string(),
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(Operation::CreateGroup, &["g1"], Method::POST, "/v2/groups/g1")]
    #[test_case(Operation::ListGroups, &[], Method::GET, "/v2/groups")]
    #[test_case(Operation::CreateRepo, &["repo"], Method::POST, "/v2/repos/repo")]
    #[test_case(Operation::PostData, &["repo"], Method::POST, "/v2/repos/repo/data")]
    #[test_case(
        Operation::CreateTransform,
        &["src", "t1", "dest"],
        Method::POST,
        "/v2/repos/src/transforms/t1/to/dest"
    )]
    #[test_case(
        Operation::CreateExport,
        &["repo", "exp"],
        Method::POST,
        "/v2/repos/repo/exports/exp"
    )]
    #[test_case(
        Operation::DeleteExport,
        &["repo", "exp", "True"],
        Method::DELETE,
        "/v2/repos/repo/exports/exp?delOffset=True"
    )]
    #[test_case(Operation::UploadPlugin, &["p1"], Method::POST, "/v2/plugins/p1")]
    #[test_case(Operation::VerifyTransform, &[], Method::POST, "/v2/verify/transform")]
    #[test_case(Operation::VerifyExport, &[], Method::POST, "/v2/verify/export")]
    #[test_case(
        Operation::LogdbSendLog,
        &["logs", "true"],
        Method::POST,
        "/v5/repos/logs/data?omitInvalidLog=true"
    )]
    fn test_route(op: Operation, args: &[&str], method: Method, path: &str) {
        let route = op.route(args).unwrap();
        assert_eq!(route.method, method);
        assert_eq!(route.path, path);
        assert_eq!(route.operation, op);
    }

    #[test_case("x?delOffset=True", "x%3FdelOffset%3DTrue"; "query in name")]
    #[test_case("a/b", "a%2Fb"; "slash in name")]
    #[test_case("frag#1", "frag%231"; "fragment in name")]
    #[test_case("a b+c", "a%20b%2Bc"; "space and plus")]
    #[test_case("exp_1.v2-x", "exp_1.v2-x"; "unreserved kept")]
    fn test_route_encodes_path_segments(name: &str, encoded: &str) {
        let route = Operation::DeleteExport
            .route(&["repo", name, "False"])
            .unwrap();
        assert_eq!(
            route.path,
            format!("/v2/repos/repo/exports/{encoded}?delOffset=False")
        );
    }

    #[test]
    fn test_route_leaves_query_arguments_alone() {
        let route = Operation::LogdbQueryLog
            .route(&["logs", "msg%3Aerror", "", "0", "10"])
            .unwrap();
        assert_eq!(route.path, "/v5/repos/logs/search?q=msg%3Aerror&sort=&from=0&size=10");
    }

    #[test]
    fn test_route_arity_mismatch_fails_fast() {
        let err = Operation::CreateExport.route(&["repo"]).unwrap_err();
        assert!(matches!(err, Error::Internal { .. }));

        let err = Operation::ListGroups.route(&["extra"]).unwrap_err();
        assert!(matches!(err, Error::Internal { .. }));
    }

    #[test]
    fn test_operation_from_name() {
        assert_eq!(
            "CreateExport".parse::<Operation>().unwrap(),
            Operation::CreateExport
        );
        let err = "CreateWidget".parse::<Operation>().unwrap_err();
        assert!(matches!(err, Error::UnknownOperation { ref name } if name == "CreateWidget"));
    }

    #[test]
    fn test_registry_names_are_unique_and_round_trip() {
        for op in Operation::ALL {
            assert_eq!(op.name().parse::<Operation>().unwrap(), *op);
            assert!(op.template().starts_with("/v"));
        }
        assert_eq!(Operation::ALL.len(), 37);
    }
}
