//! Prompt templates for the five pipeline stages
//!
//! Each template is static text with `{name}` slots resolved from the
//! variable store. Slot names must match the stage's declared inputs; the
//! registry tests assert the correspondence.

/// Stage 1: generate code from the business requirement.
pub const CODE_GENERATION: &str = r"You are a professional software engineer. Generate high-quality Python function code for the following business requirement.

Business requirement:
{business_requirement}

The generated code must meet these standards:
1. Follow the PEP 8 style conventions
2. Include detailed docstrings
3. Include appropriate error handling
4. Be concise, efficient, and easy to understand
5. Use suitable design patterns and best practices

Output only the code, with no explanation.

Generated code:
";

/// Stage 2: review the generated code.
pub const CODE_REVIEW: &str = r"You are an experienced code reviewer. Perform a thorough review of the following code.

Business requirement:
{business_requirement}

Generated code:
{generated_code}

Review the code along these dimensions:
1. Code quality - does it follow PEP 8, is it concise and efficient
2. Functional completeness - does it fully satisfy the business requirement
3. Error handling - are failures handled appropriately
4. Security - are there any security concerns
5. Maintainability - is the code easy to understand and change
6. Performance - is there room for optimisation

Give concrete improvement suggestions, including the parts of the code that need to change.

Code review:
";

/// Stage 3: improve the code according to the review.
pub const CODE_IMPROVEMENT: &str = r"You are a professional software engineer. Improve the code below using the information provided.

Business requirement:
{business_requirement}

Original code:
{generated_code}

Code review findings:
{code_review}

Produce a new version of the code that:
1. Resolves every issue raised in the code review
2. Keeps the code readable and maintainable
3. Fully satisfies the business requirement
4. Follows Python best practices

Output only the improved code, with no explanation.

Improved code:
";

/// Stage 4: describe test cases for the improved code.
pub const TEST_CASE_GENERATION: &str = r"You are a testing expert. Create comprehensive test cases for the following business requirement and code.

Business requirement:
{business_requirement}

Improved code:
{improved_code}

Produce at least 5 test cases. Each test case must include:
1. Test case id and name
2. Purpose of the test
3. Preconditions
4. Test steps
5. Expected result
6. Test data

The test cases must cover:
- The normal flow
- Boundary conditions
- Failure scenarios
- Performance, where applicable

Test cases:
";

/// Stage 5: generate unit-test code from the test cases.
pub const UNIT_TEST_GENERATION: &str = r"You are a test-driven development expert. Generate Python unit-test code from the information below.

Business requirement:
{business_requirement}

Improved code:
{improved_code}

Test cases:
{test_cases}

Use the pytest framework and make sure the tests:
1. Cover every scenario described in the test cases
2. Contain appropriate assertions
3. Use suitable fixtures
4. Are clear and easy to read
5. Carry the necessary comments

Output only the unit-test code, with no explanation.

Unit-test code:
";
