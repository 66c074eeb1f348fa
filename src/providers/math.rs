//! Math tools: descriptors, argument types and handlers.

use serde::Deserialize;
use serde_json::{json, Value};

use super::{decode, optional_whole_number, whole_number};
use crate::error::RegistryError;
use crate::math::concepts::{self, Level};
use crate::math::expression::{parse_arithmetic, ExpressionError};
use crate::math::fractions::{self, FractionOp};
use crate::math::geometry::{self, GeometryOp};
use crate::math::trig::{self, AngleUnit, TrigFunction};
use crate::math::{algebra, arithmetic, logarithm, number, number_theory, MathResult};
use crate::mcp::registry::{ToolDescriptor, ToolError, ToolOutcome, ToolRegistry};
use crate::mcp::schema::{InputSchema, PropertySchema, ValueKind};

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOp {
    const NAMES: &'static [&'static str] = &["add", "subtract", "multiply", "divide"];
}

#[derive(Debug, Deserialize)]
struct ArithmeticArgs {
    operation: ArithmeticOp,
    a: f64,
    b: f64,
}

fn basic_arithmetic(arguments: &Value) -> MathResult {
    let args: ArithmeticArgs = decode(arguments)?;
    match args.operation {
        ArithmeticOp::Add => Ok(arithmetic::add(args.a, args.b)),
        ArithmeticOp::Subtract => Ok(arithmetic::subtract(args.a, args.b)),
        ArithmeticOp::Multiply => Ok(arithmetic::multiply(args.a, args.b)),
        ArithmeticOp::Divide => arithmetic::divide(args.a, args.b),
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum AdvancedOp {
    Power,
    Sqrt,
    Factorial,
    Abs,
    RoundNumber,
}

impl AdvancedOp {
    const NAMES: &'static [&'static str] = &["power", "sqrt", "factorial", "abs", "round_number"];
}

#[derive(Debug, Deserialize)]
struct AdvancedArgs {
    operation: AdvancedOp,
    value: f64,
    #[serde(default)]
    extra_param: f64,
}

#[allow(clippy::cast_possible_truncation)]
fn advanced_operations(arguments: &Value) -> MathResult {
    let args: AdvancedArgs = decode(arguments)?;
    match args.operation {
        AdvancedOp::Power => arithmetic::power(args.value, args.extra_param),
        AdvancedOp::Sqrt => arithmetic::sqrt(args.value),
        AdvancedOp::Factorial => arithmetic::factorial(args.value),
        AdvancedOp::Abs => Ok(arithmetic::abs(args.value)),
        // Saturating cast; anything beyond i32 is far past f64 precision anyway
        AdvancedOp::RoundNumber => arithmetic::round_number(args.value, args.extra_param as i32),
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum NumberTheoryOp {
    Gcd,
    Lcm,
    PrimeFactors,
    IsPrime,
}

impl NumberTheoryOp {
    const NAMES: &'static [&'static str] = &["gcd", "lcm", "prime_factors", "is_prime"];
}

#[derive(Debug, Deserialize)]
struct NumberTheoryArgs {
    operation: NumberTheoryOp,
    #[serde(deserialize_with = "whole_number")]
    a: i64,
    #[serde(default, deserialize_with = "optional_whole_number")]
    b: Option<i64>,
}

fn number_theory(arguments: &Value) -> MathResult {
    let args: NumberTheoryArgs = decode(arguments)?;
    let b = args.b.unwrap_or(0);
    match args.operation {
        NumberTheoryOp::Gcd => Ok(number_theory::gcd(args.a, b)),
        NumberTheoryOp::Lcm => number_theory::lcm(args.a, b),
        NumberTheoryOp::PrimeFactors => number_theory::prime_factors(args.a),
        NumberTheoryOp::IsPrime => number_theory::is_prime(args.a),
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum EquationType {
    Linear,
    Quadratic,
}

#[derive(Debug, Deserialize)]
struct EquationArgs {
    equation_type: EquationType,
    a: f64,
    b: f64,
    #[serde(default)]
    c: f64,
}

#[allow(clippy::unnecessary_wraps)]
fn solve_equations(arguments: &Value) -> MathResult {
    let args: EquationArgs = decode(arguments)?;
    Ok(match args.equation_type {
        EquationType::Linear => algebra::solve_linear(args.a, args.b),
        EquationType::Quadratic => algebra::solve_quadratic(args.a, args.b, args.c),
    })
}

#[derive(Debug, Deserialize)]
struct GeometryArgs {
    operation: GeometryOp,
    values: Vec<f64>,
}

fn geometry(arguments: &Value) -> MathResult {
    let args: GeometryArgs = decode(arguments)?;
    geometry::compute(args.operation, &args.values)
}

#[derive(Debug, Deserialize)]
struct TrigArgs {
    function: TrigFunction,
    angle: f64,
    #[serde(default)]
    unit: AngleUnit,
}

fn trigonometry(arguments: &Value) -> MathResult {
    let args: TrigArgs = decode(arguments)?;
    Ok(trig::evaluate(args.function, args.angle, args.unit))
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum LogType {
    Log,
    Log10,
}

const fn natural_base() -> f64 {
    std::f64::consts::E
}

#[derive(Debug, Deserialize)]
struct LogArgs {
    log_type: LogType,
    x: f64,
    #[serde(default = "natural_base")]
    base: f64,
}

fn logarithms(arguments: &Value) -> MathResult {
    let args: LogArgs = decode(arguments)?;
    match args.log_type {
        LogType::Log => logarithm::log(args.x, args.base),
        LogType::Log10 => logarithm::log10(args.x),
    }
}

#[derive(Debug, Deserialize)]
struct FractionArgs {
    operation: FractionOp,
    #[serde(default, deserialize_with = "optional_whole_number")]
    numerator: Option<i64>,
    #[serde(default, deserialize_with = "optional_whole_number")]
    denominator: Option<i64>,
    #[serde(default)]
    decimal: Option<f64>,
}

fn needed<T>(value: Option<T>, field: &str, operation: &str) -> Result<T, ToolError> {
    value.ok_or_else(|| ToolError::new(format!("Operation '{operation}' requires '{field}'")))
}

fn fractions(arguments: &Value) -> MathResult {
    let args: FractionArgs = decode(arguments)?;
    let operation = FractionOp::NAMES[args.operation as usize];
    match args.operation {
        FractionOp::SimplifyFraction | FractionOp::ConvertToDecimal => {
            let numerator = needed(args.numerator, "numerator", operation)?;
            let denominator = needed(args.denominator, "denominator", operation)?;
            if matches!(args.operation, FractionOp::SimplifyFraction) {
                fractions::simplify_fraction(numerator, denominator)
            } else {
                fractions::convert_to_decimal(numerator, denominator)
            }
        }
        FractionOp::ConvertToFraction => {
            fractions::convert_to_fraction(needed(args.decimal, "decimal", operation)?)
        }
    }
}

#[derive(Debug, Deserialize)]
struct PercentageArgs {
    part: f64,
    whole: f64,
}

fn percentages(arguments: &Value) -> MathResult {
    let args: PercentageArgs = decode(arguments)?;
    arithmetic::percentage(args.part, args.whole)
}

#[derive(Debug, Deserialize)]
struct ExpressionArgs {
    expression: String,
}

fn evaluate_expression(arguments: &Value) -> MathResult {
    let args: ExpressionArgs = decode(arguments)?;
    let evaluation_error =
        |e: ExpressionError| ToolError::new(format!("Error evaluating expression: {e}"));

    let value = parse_arithmetic(&args.expression)
        .and_then(|expr| expr.evaluate_checked(0.0))
        .map_err(evaluation_error)?;

    Ok(ToolOutcome::new(
        number(value),
        format!("Expression evaluation: {} = {value}", args.expression.trim()),
    )
    .steps([
        format!("Parse expression: {}", args.expression.trim()),
        format!("Evaluate: {value}"),
    ]))
}

#[derive(Debug, Deserialize)]
struct ConceptArgs {
    concept: String,
    #[serde(default)]
    level: Level,
}

fn explain_concept(arguments: &Value) -> MathResult {
    let args: ConceptArgs = decode(arguments)?;
    Ok(concepts::explain(&args.concept, args.level))
}

/// Registers the math tools.
///
/// # Errors
///
/// Fails if any tool is already registered.
pub fn register(tools: &mut ToolRegistry) -> Result<(), RegistryError> {
    tools.register(
        ToolDescriptor::new(
            "basic_arithmetic",
            "Perform basic arithmetic operations (add, subtract, multiply, divide)",
            InputSchema::new()
                .required(
                    "operation",
                    PropertySchema::one_of(ArithmeticOp::NAMES)
                        .describe("The arithmetic operation to perform"),
                )
                .required("a", PropertySchema::number().describe("First number"))
                .required("b", PropertySchema::number().describe("Second number")),
        ),
        basic_arithmetic,
    )?;

    tools.register(
        ToolDescriptor::new(
            "advanced_operations",
            "Perform advanced mathematical operations",
            InputSchema::new()
                .required(
                    "operation",
                    PropertySchema::one_of(AdvancedOp::NAMES).describe("The operation to perform"),
                )
                .required("value", PropertySchema::number().describe("The input value"))
                .optional(
                    "extra_param",
                    PropertySchema::number()
                        .describe("Exponent for power, decimal places for round_number")
                        .default_value(json!(0)),
                ),
        ),
        advanced_operations,
    )?;

    tools.register(
        ToolDescriptor::new(
            "number_theory",
            "Number theory operations (GCD, LCM, prime factors, primality test)",
            InputSchema::new()
                .required(
                    "operation",
                    PropertySchema::one_of(NumberTheoryOp::NAMES)
                        .describe("The number theory operation"),
                )
                .required("a", PropertySchema::integer().describe("First integer"))
                .optional(
                    "b",
                    PropertySchema::integer()
                        .describe("Second integer (for gcd and lcm)")
                        .default_value(json!(0)),
                ),
        ),
        number_theory,
    )?;

    tools.register(
        ToolDescriptor::new(
            "solve_equations",
            "Solve linear and quadratic equations",
            InputSchema::new()
                .required(
                    "equation_type",
                    PropertySchema::one_of(&["linear", "quadratic"])
                        .describe("Type of equation to solve"),
                )
                .required("a", PropertySchema::number().describe("Coefficient a"))
                .required("b", PropertySchema::number().describe("Coefficient b"))
                .optional(
                    "c",
                    PropertySchema::number()
                        .describe("Coefficient c (quadratic only)")
                        .default_value(json!(0)),
                ),
        ),
        solve_equations,
    )?;

    tools.register(
        ToolDescriptor::new(
            "geometry",
            "Calculate areas, distances, and other geometric properties",
            InputSchema::new()
                .required(
                    "operation",
                    PropertySchema::one_of(GeometryOp::NAMES).describe("The geometric calculation"),
                )
                .required(
                    "values",
                    PropertySchema::array_of(ValueKind::Number)
                        .describe("Input values, in the order the operation expects"),
                ),
        ),
        geometry,
    )?;

    tools.register(
        ToolDescriptor::new(
            "trigonometry",
            "Trigonometric functions (sin, cos, tan)",
            InputSchema::new()
                .required(
                    "function",
                    PropertySchema::one_of(TrigFunction::NAMES)
                        .describe("The trigonometric function"),
                )
                .required("angle", PropertySchema::number().describe("The angle"))
                .optional(
                    "unit",
                    PropertySchema::one_of(AngleUnit::NAMES)
                        .describe("Angle unit")
                        .default_value(json!("radians")),
                ),
        ),
        trigonometry,
    )?;

    tools.register(
        ToolDescriptor::new(
            "logarithms",
            "Logarithmic functions",
            InputSchema::new()
                .required(
                    "log_type",
                    PropertySchema::one_of(&["log", "log10"]).describe("Type of logarithm"),
                )
                .required("x", PropertySchema::number().describe("The input value"))
                .optional(
                    "base",
                    PropertySchema::number()
                        .describe("Logarithm base (for log)")
                        .default_value(json!(std::f64::consts::E)),
                ),
        ),
        logarithms,
    )?;

    tools.register(
        ToolDescriptor::new(
            "fractions",
            "Work with fractions (simplify, convert to/from decimal)",
            InputSchema::new()
                .required(
                    "operation",
                    PropertySchema::one_of(FractionOp::NAMES).describe("The fraction operation"),
                )
                .optional("numerator", PropertySchema::integer().describe("Numerator"))
                .optional("denominator", PropertySchema::integer().describe("Denominator"))
                .optional(
                    "decimal",
                    PropertySchema::number().describe("Decimal value (for convert_to_fraction)"),
                ),
        ),
        fractions,
    )?;

    tools.register(
        ToolDescriptor::new(
            "percentages",
            "Calculate percentages",
            InputSchema::new()
                .required("part", PropertySchema::number().describe("The part value"))
                .required("whole", PropertySchema::number().describe("The whole value")),
        ),
        percentages,
    )?;

    tools.register(
        ToolDescriptor::new(
            "evaluate_expression",
            "Safely evaluate mathematical expressions",
            InputSchema::new().required(
                "expression",
                PropertySchema::string()
                    .describe("Arithmetic expression using + - * / ^ and parentheses"),
            ),
        ),
        evaluate_expression,
    )?;

    tools.register(
        ToolDescriptor::new(
            "explain_concept",
            "Explain mathematical concepts with examples",
            InputSchema::new()
                .required("concept", PropertySchema::string().describe("The concept to explain"))
                .optional(
                    "level",
                    PropertySchema::one_of(Level::NAMES)
                        .describe("Education level")
                        .default_value(json!("middle")),
                ),
        ),
        explain_concept,
    )?;

    Ok(())
}
