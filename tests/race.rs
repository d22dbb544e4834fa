/*!
 * Race engine tests entry point
 */

#[path = "race/common.rs"]
mod common;

#[path = "race/scenarios_test.rs"]
mod scenarios_test;

#[path = "race/classifier_test.rs"]
mod classifier_test;

#[path = "race/mock_gateway_test.rs"]
mod mock_gateway_test;
