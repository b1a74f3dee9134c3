//! Recursive Planner
//!
//! Decomposes an objective into steps via the `create_plan` capability, then
//! expands every step the same way with the objective pushed onto the stack of
//! ancestors. Expansions are appended to the end of the list being walked.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{AgentError, Result};
use crate::expr::{DataResponse, Evaluator, FunctionRegistry, LlmFunction, ResponseValue};
use crate::function::{FunctionDeclaration, ParameterSchema};
use crate::provider::{GenerationOptions, LlmProvider};

pub const CREATE_PLAN: &str = "create_plan";
pub const DATA_PLAN: &str = "__data_plan";
pub const DATA_ATOMIC: &str = "__data_atomic";

/// The `create_plan` capability
pub struct CreatePlan;

impl LlmFunction for CreatePlan {
    fn declaration(&self) -> FunctionDeclaration {
        FunctionDeclaration::new(
            CREATE_PLAN,
            "Given an objective, create a plan for the objective.",
        )
        .param(ParameterSchema::string("objective").required())
    }

    fn helper_functions(&self) -> Vec<FunctionDeclaration> {
        vec![
            FunctionDeclaration::new(DATA_PLAN, "A plan to fulfill an objective.")
                .param(ParameterSchema::array_of("steps", "string").required()),
            FunctionDeclaration::new(
                DATA_ATOMIC,
                "An objective that is too small to further plan.",
            ),
        ]
    }

    fn prompt(&self, arguments: &Map<String, Value>) -> Result<String> {
        let objective = arguments
            .get("objective")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AgentError::ToolValidation(format!("{CREATE_PLAN}: missing 'objective'"))
            })?;

        Ok(format!(
            "Create a plan to fulfill the following objective: {objective}. \
             Invoke the function '{DATA_PLAN}' with the steps of the plan.\n\
             Some objectives are too small in scope already to further break them down into steps. \
             In that case, invoke the function named '{DATA_ATOMIC}'."
        ))
    }
}

/// Typed view of the planner's data responses
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlanData {
    Plan { steps: Vec<String> },
    Atomic,
}

#[derive(Deserialize)]
struct PlanArgs {
    steps: Vec<String>,
}

impl TryFrom<&DataResponse> for PlanData {
    type Error = AgentError;

    fn try_from(response: &DataResponse) -> Result<Self> {
        match response.name.as_str() {
            DATA_PLAN => {
                let args: PlanArgs =
                    serde_json::from_value(Value::Object(response.data.clone()))?;
                Ok(Self::Plan { steps: args.steps })
            }
            DATA_ATOMIC => Ok(Self::Atomic),
            other => Err(AgentError::UnknownData(other.to_string())),
        }
    }
}

/// One entry of a plan
#[derive(Clone, Debug, PartialEq)]
pub enum PlanStep {
    /// A step proposed by the model
    Step(String),
    /// Sentinel for an objective too small to decompose
    Atomic {
        objective: String,
        response: DataResponse,
    },
}

impl std::fmt::Display for PlanStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Step(step) => write!(f, "{step}"),
            Self::Atomic { objective, .. } => write!(f, "[atomic] {objective}"),
        }
    }
}

/// Prompt asking for a plan, with the ancestor chain as context
pub fn plan_prompt(objectives: &[String], objective: &str) -> String {
    if objectives.is_empty() {
        return format!("I need help creating a plan for the following objective: {objective}");
    }

    let chain = objectives
        .iter()
        .enumerate()
        .map(|(i, o)| format!("{}. {o}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "I am in the process of completing the following objectives. They're ordered in a list, \
         and each objective is a part of the plan to complete the immediately previous objective in the list.:\n\
         {chain}\n\n\
         Help me create a plan for the objective I'm currently focusing on: {objective}"
    )
}

/// One log line for a proposed plan, quoted once per ancestor objective
fn step_log(depth: usize, steps: &[String]) -> String {
    if depth == 0 {
        format!("{steps:?}")
    } else {
        format!("{} {steps:?}", ">".repeat(depth))
    }
}

/// Recursive planner over the `create_plan` capability
pub struct Planner {
    evaluator: Evaluator,
}

impl Planner {
    pub fn new(provider: Arc<dyn LlmProvider>, options: GenerationOptions) -> Self {
        let mut functions = FunctionRegistry::new();
        functions.register(CreatePlan);

        Self {
            evaluator: Evaluator::new(provider, Arc::new(functions), options),
        }
    }

    /// Plan `objective` given its ancestors, oldest first
    pub fn make_plan<'a>(
        &'a self,
        objectives: &'a [String],
        objective: &'a str,
    ) -> BoxFuture<'a, Result<Vec<PlanStep>>> {
        Box::pin(async move {
            let response = self
                .evaluator
                .eval_prompt(plan_prompt(objectives, objective))
                .await?;

            let data = match response {
                ResponseValue::Data(data) => data,
                ResponseValue::Text(text) => {
                    return Err(AgentError::UnexpectedResponse(format!(
                        "expected plan data, got text: {text}"
                    )));
                }
            };

            match PlanData::try_from(&data)? {
                PlanData::Atomic => Ok(vec![PlanStep::Atomic {
                    objective: objective.to_string(),
                    response: data,
                }]),
                PlanData::Plan { steps } => {
                    tracing::info!("{}", step_log(objectives.len(), &steps));

                    let mut ancestors = objectives.to_vec();
                    ancestors.push(objective.to_string());

                    let proposed = steps.len();
                    let mut plan: Vec<PlanStep> = steps.into_iter().map(PlanStep::Step).collect();

                    // Expansions land at the end; only the proposed steps are expanded.
                    let mut i = 0;
                    while i < proposed {
                        if let PlanStep::Step(step) = plan[i].clone() {
                            let sub_plan = self.make_plan(&ancestors, &step).await?;
                            plan.extend(sub_plan);
                        }
                        i += 1;
                    }

                    Ok(plan)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::mock::{self, ScriptedProvider};

    fn atomic() -> crate::provider::Completion {
        mock::call(DATA_ATOMIC, &json!({}))
    }

    fn plan(steps: &[&str]) -> crate::provider::Completion {
        mock::call(DATA_PLAN, &json!({ "steps": steps }))
    }

    fn planner(provider: &Arc<ScriptedProvider>) -> Planner {
        Planner::new(provider.clone(), GenerationOptions::default())
    }

    fn atomic_step(objective: &str) -> PlanStep {
        PlanStep::Atomic {
            objective: objective.into(),
            response: DataResponse::new(DATA_ATOMIC, Map::new()),
        }
    }

    #[tokio::test]
    async fn test_atomic_objective_yields_single_step() {
        let provider = Arc::new(ScriptedProvider::new([atomic()]));
        let steps = planner(&provider).make_plan(&[], "boil water").await.unwrap();

        assert_eq!(steps, vec![atomic_step("boil water")]);
        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].functions, vec![CREATE_PLAN]);
        assert_eq!(
            requests[0].last_text(),
            "I need help creating a plan for the following objective: boil water"
        );
    }

    #[tokio::test]
    async fn test_expansions_are_appended_after_steps() {
        let provider = Arc::new(ScriptedProvider::new([plan(&["s1", "s2"]), atomic(), atomic()]));
        let steps = planner(&provider).make_plan(&[], "root").await.unwrap();

        assert_eq!(
            steps,
            vec![
                PlanStep::Step("s1".into()),
                PlanStep::Step("s2".into()),
                atomic_step("s1"),
                atomic_step("s2"),
            ]
        );
        assert_eq!(provider.remaining(), 0);
    }

    #[tokio::test]
    async fn test_nested_expansion_order() {
        let provider = Arc::new(ScriptedProvider::new([
            plan(&["s1", "s2"]),
            plan(&["a"]),
            atomic(),
            atomic(),
        ]));
        let steps = planner(&provider).make_plan(&[], "root").await.unwrap();

        let rendered: Vec<String> = steps.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["s1", "s2", "a", "[atomic] a", "[atomic] s2"]);
        assert_eq!(provider.remaining(), 0);
    }

    #[tokio::test]
    async fn test_ancestor_stack_grows_by_caller_objective() {
        let provider = Arc::new(ScriptedProvider::new([
            plan(&["s1"]),
            plan(&["s1a"]),
            atomic(),
        ]));
        let steps = planner(&provider).make_plan(&[], "root").await.unwrap();

        assert_eq!(
            steps,
            vec![
                PlanStep::Step("s1".into()),
                PlanStep::Step("s1a".into()),
                atomic_step("s1a"),
            ]
        );

        let requests = provider.requests();
        assert_eq!(requests[1].last_text(), plan_prompt(&["root".into()], "s1"));
        assert!(requests[1].last_text().contains("1. root\n\nHelp me"));
        assert_eq!(
            requests[2].last_text(),
            plan_prompt(&["root".into(), "s1".into()], "s1a")
        );
        assert!(requests[2].last_text().contains("1. root\n2. s1\n"));
    }

    #[tokio::test]
    async fn test_planning_goes_through_create_plan() {
        let provider = Arc::new(ScriptedProvider::new([
            mock::call(CREATE_PLAN, &json!({"objective": "bake bread"})),
            atomic(),
        ]));
        let steps = planner(&provider).make_plan(&[], "bake bread").await.unwrap();

        assert_eq!(steps.len(), 1);
        let requests = provider.requests();
        assert_eq!(requests[1].functions, vec![DATA_PLAN, DATA_ATOMIC]);
        assert!(requests[1].last_text().starts_with(
            "Create a plan to fulfill the following objective: bake bread."
        ));
    }

    #[tokio::test]
    async fn test_text_response_is_fatal() {
        let provider = Arc::new(ScriptedProvider::new([mock::stop("Sure, here's a plan")]));
        let err = planner(&provider).make_plan(&[], "root").await.unwrap_err();
        assert!(matches!(err, AgentError::UnexpectedResponse(_)));
    }

    #[tokio::test]
    async fn test_unknown_data_name_is_fatal() {
        let provider = Arc::new(ScriptedProvider::new([mock::call(
            "__data_wishlist",
            &json!({}),
        )]));
        let err = planner(&provider).make_plan(&[], "root").await.unwrap_err();
        assert!(matches!(err, AgentError::UnknownData(name) if name == "__data_wishlist"));
    }

    #[tokio::test]
    async fn test_malformed_plan_is_fatal() {
        let provider = Arc::new(ScriptedProvider::new([mock::call(
            DATA_PLAN,
            &json!({"steps": "not a list"}),
        )]));
        let err = planner(&provider).make_plan(&[], "root").await.unwrap_err();
        assert!(matches!(err, AgentError::Json(_)));
    }

    #[test]
    fn test_create_plan_requires_objective() {
        assert!(matches!(
            CreatePlan.prompt(&Map::new()),
            Err(AgentError::ToolValidation(_))
        ));
    }

    #[test]
    fn test_step_log_quotes_by_depth() {
        let steps = vec!["s1".to_string(), "s2".to_string()];
        assert_eq!(step_log(0, &steps), r#"["s1", "s2"]"#);
        assert_eq!(step_log(2, &steps), r#">> ["s1", "s2"]"#);
    }

    #[test]
    fn test_step_display() {
        assert_eq!(PlanStep::Step("buy rings".into()).to_string(), "buy rings");
        assert_eq!(atomic_step("buy rings").to_string(), "[atomic] buy rings");
    }
}
