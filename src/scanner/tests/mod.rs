mod property_tests;

use crate::config::HintConfig;
use crate::dictionary::record::tests::record;
use crate::dictionary::{builtin, Dictionary, StaticDictionary, VariantsTable};
use crate::scanner::{KeywordIndex, ScanDriver};

pub(super) fn index(keywords: &[&str]) -> KeywordIndex {
    let dict = Dictionary::from_records(keywords.iter().map(|k| record(k, "Pattern")).collect()).unwrap();
    KeywordIndex::build(&dict, &VariantsTable::new()).unwrap()
}

pub(super) fn builtin_index() -> KeywordIndex {
    KeywordIndex::build(&builtin::dictionary().unwrap(), &builtin::variants().unwrap()).unwrap()
}

pub(super) fn builtin_driver() -> ScanDriver {
    let provider = StaticDictionary::ready(builtin::dictionary().unwrap());
    ScanDriver::new(&provider, &builtin::variants().unwrap(), HintConfig::default()).unwrap()
}

/// Problem statements in the style of the target site
pub(super) const SAMPLE_TEXTS: &[&str] = &[
    "Given an integer array nums, return the running sum of nums.",
    "Given a string s, find the length of the longest substring without repeating characters.",
    "Given the head of a Linked-List, reverse the list, and return the reversed list.",
    "Suppose an array of length n sorted in ascending order is rotated between 1 and n times.",
    "Given an integer array nums and an integer k, return the kth largest element in the array.",
    "Return all possible subsets (the power set). The solution set must not contain duplicate subsets.",
    "Given a string s containing just the characters '(', ')', '{', '}', '[' and ']', determine if the input string is valid.",
    "A peak element is an element that is strictly greater than its neighbors.",
    "You are climbing a staircase. In how many ways can you climb to the top?",
    "arrays of subarrays, SUBSTRING, sub-array, Top-K frequent elements, binary-search…",
    "",
    "   ",
    "Ünïcödé tëxt wïth a hash map and naïve café tree-walk",
];
